mod settings;
mod task_form;
mod tasks;

pub use settings::SettingsPage;
pub use tasks::{
  TaskCreatePage,
  TaskDetailPage,
  TaskListPage
};
