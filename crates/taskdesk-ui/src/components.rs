mod column_filter;
mod confirm_dialog;
mod data_table;
mod form_card;
mod not_found;
mod pager;
mod row_actions;
mod toasts;
mod top_toolbar;

pub use column_filter::ColumnFilterCell;
pub use confirm_dialog::ConfirmDialog;
pub use data_table::{
  BulkHandler,
  DataTable
};
pub use form_card::FormCard;
pub use not_found::NotFound;
pub use pager::{
  GridFooter,
  ListFooter
};
pub use row_actions::RowActions;
pub use toasts::{
  ToastHost,
  ToastList,
  ToastSink
};
pub use top_toolbar::{
  ToolbarContext,
  TopToolbar
};
