use taskdesk_core::i18n::Text;
use yew::{
  AttrValue,
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
pub struct RowActionsProps {
  pub id:       AttrValue,
  pub editable: bool,
  pub on_open:  Callback<(String, bool)>
}

/// Default per-row actions: view always,
/// edit unless disabled.
#[function_component(RowActions)]
pub fn row_actions(
  props: &RowActionsProps
) -> Html {
  let locale = use_context::<LocaleContext>()
    .map(|ctx| ctx.locale)
    .unwrap_or_default();
  let open = |edit: bool| {
    let on_open = props.on_open.clone();
    let id = props.id.to_string();
    Callback::from(move |e: MouseEvent| {
      e.stop_propagation();
      on_open.emit((id.clone(), edit));
    })
  };

  html! {
      <div class="row-actions">
          <button class="btn ghost" onclick={open(false)}>{ locale.text(Text::View) }</button>
          {
              if props.editable {
                  html! { <button class="btn ghost" onclick={open(true)}>{ locale.text(Text::Edit) }</button> }
              } else {
                  html! {}
              }
          }
      </div>
  }
}
