use std::cell::RefCell;
use std::rc::Rc;

use gloo::timers::callback::Timeout;
use taskdesk_core::export::ExportFormat;
use taskdesk_core::filter_state::{
  FilterChange,
  FilterState,
  ViewMode
};
use taskdesk_core::i18n::Text;
use taskdesk_core::remote::BulkAction;
use yew::{
  Callback,
  Html,
  InputEvent,
  MouseEvent,
  Properties,
  TargetCast,
  function_component,
  html,
  use_context,
  use_effect_with,
  use_mut_ref,
  use_state
};

use crate::app::LocaleContext;

const SEARCH_DEBOUNCE_MS: u32 = 300;

/// Everything a toolbar needs from the table it sits on. Handed to a
/// custom toolbar renderer in place of the built-in [`TopToolbar`].
#[derive(Clone, PartialEq)]
pub struct ToolbarContext {
  pub filter:           FilterState,
  pub selected:         usize,
  pub bulk_action:      BulkAction,
  pub export_open:      bool,
  pub on_change:        Callback<FilterChange>,
  pub on_reset:         Callback<()>,
  pub on_bulk:          Callback<()>,
  pub on_toggle_export: Callback<()>,
  pub on_export:        Callback<ExportFormat>
}

#[derive(Properties, PartialEq)]
pub struct TopToolbarProps {
  pub context: ToolbarContext,
  #[prop_or_default]
  pub extra:   Html
}

/// Text the search box should show once
/// the applied search changed under it.
fn resynced_search(
  shown: &str,
  applied: &str
) -> Option<String> {
  (shown != applied)
    .then(|| applied.to_string())
}

#[function_component(TopToolbar)]
pub fn top_toolbar(
  props: &TopToolbarProps
) -> Html {
  let ctx = &props.context;
  let locale = use_context::<LocaleContext>()
    .map(|locale_ctx| locale_ctx.locale)
    .unwrap_or_default();
  let search = {
    let initial =
      ctx.filter.global_filter.clone();
    use_state(move || initial)
  };
  let pending: Rc<RefCell<Option<Timeout>>> =
    use_mut_ref(|| None);

  // Back/forward and reset change the filter without typing.
  {
    let search = search.clone();
    use_effect_with(
      ctx.filter.global_filter.clone(),
      move |text| {
        if let Some(next) =
          resynced_search(&search, text)
        {
          search.set(next);
        }
      }
    );
  }

  let on_search = {
    let search = search.clone();
    let on_change =
      ctx.on_change.clone();
    Callback::from(
      move |e: InputEvent| {
        let input: web_sys::HtmlInputElement =
          e.target_unchecked_into();
        let value = input.value();
        search.set(value.clone());

        let on_change = on_change.clone();
        let timeout = Timeout::new(
          SEARCH_DEBOUNCE_MS,
          move || {
            on_change.emit(
              FilterChange::GlobalFilter(
                value
              )
            )
          }
        );
        // Dropping the previous timeout cancels it.
        pending.borrow_mut().replace(timeout);
      }
    )
  };

  let emit = |change: FilterChange| {
    let on_change =
      ctx.on_change.clone();
    Callback::from(
      move |_: MouseEvent| {
        on_change.emit(change.clone())
      }
    )
  };
  let forward = |cb: &Callback<()>| {
    let cb = cb.clone();
    Callback::from(move |_: MouseEvent| {
      cb.emit(())
    })
  };

  let trash_class = if ctx.filter.is_trash {
    "btn toggle on"
  } else {
    "btn toggle"
  };
  let view_label = match ctx.filter.view {
    | ViewMode::List => {
      locale.text(Text::GridView)
    }
    | ViewMode::Grid => {
      locale.text(Text::ListView)
    }
  };
  let bulk_label = match ctx.bulk_action
  {
    | BulkAction::Delete => {
      locale.text(Text::Delete)
    }
    | BulkAction::Restore => {
      locale.text(Text::Restore)
    }
  };

  html! {
      <div class="toolbar">
          <input
              class="search"
              type="search"
              placeholder={locale.text(Text::Search)}
              value={(*search).clone()}
              oninput={on_search}
          />
          <button class={trash_class} onclick={emit(FilterChange::ToggleTrash)}>
              { locale.text(Text::Trash) }
          </button>
          <button class="btn" onclick={emit(FilterChange::ToggleView)}>{ view_label }</button>
          <div class="menu">
              <button class="btn" onclick={forward(&ctx.on_toggle_export)}>{ locale.text(Text::Export) }</button>
              {
                  if ctx.export_open {
                      html! {
                          <div class="menu-items">
                              {
                                  for ExportFormat::ALL.into_iter().map(|format| {
                                      let on_export = ctx.on_export.clone();
                                      html! {
                                          <button class="menu-item" onclick={move |_: MouseEvent| on_export.emit(format)}>
                                              { format.label() }
                                          </button>
                                      }
                                  })
                              }
                          </div>
                      }
                  } else {
                      html! {}
                  }
              }
          </div>
          <button class="btn ghost" onclick={forward(&ctx.on_reset)}>{ locale.text(Text::Reset) }</button>
          {
              if ctx.selected > 0 {
                  html! {
                      <button class="btn danger" onclick={forward(&ctx.on_bulk)}>
                          { format!("{bulk_label} ({})", locale.format_count(ctx.selected as u64)) }
                      </button>
                  }
              } else {
                  html! {}
              }
          }
          <div class="toolbar-extra">{ props.extra.clone() }</div>
      </div>
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn search_box_follows_history_navigation()
   {
    assert_eq!(
      resynced_search("report", ""),
      Some(String::new())
    );
    assert_eq!(
      resynced_search("", "invoices"),
      Some("invoices".to_string())
    );
    assert_eq!(
      resynced_search("report", "report"),
      None
    );
  }
}
