use taskdesk_core::i18n::Text;
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  function_component,
  html,
  use_context
};

use crate::app::LocaleContext;

#[derive(Properties, PartialEq)]
pub struct ConfirmDialogProps {
  pub open:       bool,
  pub message:    String,
  pub on_confirm: Callback<()>,
  pub on_cancel:  Callback<()>
}

#[function_component(ConfirmDialog)]
pub fn confirm_dialog(
  props: &ConfirmDialogProps
) -> Html {
  let locale = use_context::<LocaleContext>()
    .map(|ctx| ctx.locale)
    .unwrap_or_default();
  if !props.open {
    return html! {};
  }

  let on_confirm = {
    let cb = props.on_confirm.clone();
    Callback::from(move |_: MouseEvent| {
      cb.emit(())
    })
  };
  let on_cancel = {
    let cb = props.on_cancel.clone();
    Callback::from(move |_: MouseEvent| {
      cb.emit(())
    })
  };

  html! {
      <div class="modal-backdrop">
          <div class="panel modal" role="dialog">
              <div class="header">{ locale.text(Text::ConfirmTitle) }</div>
              <p>{ props.message.clone() }</p>
              <div class="form-actions">
                  <button class="btn ghost" onclick={on_cancel}>{ locale.text(Text::Cancel) }</button>
                  <button class="btn danger" onclick={on_confirm}>{ "OK" }</button>
              </div>
          </div>
      </div>
  }
}
