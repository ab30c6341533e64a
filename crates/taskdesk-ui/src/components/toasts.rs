use std::rc::Rc;

use gloo::timers::callback::Timeout;
use taskdesk_core::notify::{
  Notification,
  NotificationSink,
  Variant
};
use yew::{
  Callback,
  Html,
  Properties,
  Reducible,
  UseReducerDispatcher,
  function_component,
  html,
  use_effect_with
};

const TOAST_LIFETIME_MS: u32 = 4_000;

#[derive(Clone, PartialEq, Default)]
pub struct ToastList {
  next_id: u64,
  items:   Vec<(u64, Notification)>
}

pub enum ToastAction {
  Push(Notification),
  Dismiss(u64)
}

impl Reducible for ToastList {
  type Action = ToastAction;

  fn reduce(
    self: Rc<Self>,
    action: Self::Action
  ) -> Rc<Self> {
    let mut next = (*self).clone();
    match action {
      | ToastAction::Push(notification) => {
        next.next_id += 1;
        next
          .items
          .push((next.next_id, notification));
      }
      | ToastAction::Dismiss(id) => {
        next
          .items
          .retain(|(item_id, _)| *item_id != id);
      }
    }
    Rc::new(next)
  }
}

/// Routes core notifications into the
/// toast stack.
pub struct ToastSink {
  dispatcher: UseReducerDispatcher<ToastList>
}

impl ToastSink {
  pub fn new(
    dispatcher: UseReducerDispatcher<ToastList>
  ) -> Self {
    Self { dispatcher }
  }
}

impl NotificationSink for ToastSink {
  fn notify(
    &self,
    notification: Notification
  ) {
    tracing::debug!(message = %notification.message, "toast");
    self
      .dispatcher
      .dispatch(ToastAction::Push(notification));
  }
}

#[derive(Properties, PartialEq)]
pub struct ToastHostProps {
  pub toasts:     ToastList,
  pub dispatcher: UseReducerDispatcher<ToastList>
}

#[function_component(ToastHost)]
pub fn toast_host(
  props: &ToastHostProps
) -> Html {
  html! {
      <div class="toasts">
          {
              for props.toasts.items.iter().map(|(id, notification)| {
                  let dispatcher = props.dispatcher.clone();
                  let id = *id;
                  html! {
                      <ToastItem
                          key={id}
                          notification={notification.clone()}
                          on_dismiss={Callback::from(move |_| dispatcher.dispatch(ToastAction::Dismiss(id)))}
                      />
                  }
              })
          }
      </div>
  }
}

#[derive(Properties, PartialEq)]
struct ToastItemProps {
  notification: Notification,
  on_dismiss:   Callback<()>
}

#[function_component(ToastItem)]
fn toast_item(
  props: &ToastItemProps
) -> Html {
  {
    let on_dismiss =
      props.on_dismiss.clone();
    use_effect_with((), move |_| {
      let timeout = Timeout::new(
        TOAST_LIFETIME_MS,
        move || on_dismiss.emit(())
      );
      move || drop(timeout)
    });
  }

  let class = match props
    .notification
    .variant
  {
    | Variant::Success => "toast success",
    | Variant::Error => "toast error",
    | Variant::Info => "toast info"
  };
  let on_close = {
    let on_dismiss =
      props.on_dismiss.clone();
    Callback::from(move |_| {
      on_dismiss.emit(())
    })
  };

  html! {
      <div class={class} role="status">
          <span class="toast-message">{ &props.notification.message }</span>
          <button class="btn ghost" onclick={on_close}>{ "×" }</button>
      </div>
  }
}
