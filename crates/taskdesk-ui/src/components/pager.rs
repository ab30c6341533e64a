use taskdesk_core::filter_state::{
  FilterChange,
  PAGE_SIZE_OPTIONS,
  Pagination,
  UNBOUNDED_PAGE_SIZE
};
use taskdesk_core::i18n::{
  Locale,
  Text
};
use taskdesk_core::table::row_range;
use yew::{
  Callback,
  Event,
  Html,
  MouseEvent,
  Properties,
  TargetCast,
  function_component,
  html,
  use_context
};

use crate::app::LocaleContext;

fn page_size_select(
  locale: Locale,
  pagination: Pagination,
  on_change: &Callback<FilterChange>
) -> Html {
  let on_change = on_change.clone();
  let onchange =
    Callback::from(move |e: Event| {
      let select: web_sys::HtmlSelectElement =
        e.target_unchecked_into();
      if let Ok(size) =
        select.value().parse::<u64>()
      {
        on_change.emit(
          FilterChange::PageSize(size)
        );
      }
    });

  html! {
      <label class="page-size">
          { locale.text(Text::RowsPerPage) }
          <select {onchange}>
              {
                  for PAGE_SIZE_OPTIONS.iter().map(|size| {
                      let label = if *size == UNBOUNDED_PAGE_SIZE {
                          locale.text(Text::All).to_string()
                      } else {
                          size.to_string()
                      };
                      html! {
                          <option value={size.to_string()} selected={*size == pagination.page_size}>{ label }</option>
                      }
                  })
              }
          </select>
      </label>
  }
}

fn go_to(
  on_change: &Callback<FilterChange>,
  page_index: u64
) -> Callback<MouseEvent> {
  let on_change = on_change.clone();
  Callback::from(move |_: MouseEvent| {
    on_change.emit(
      FilterChange::PageIndex(page_index)
    )
  })
}

#[derive(Properties, PartialEq)]
pub struct ListFooterProps {
  pub pagination: Pagination,
  pub total:      u64,
  pub on_change:  Callback<FilterChange>
}

#[function_component(ListFooter)]
pub fn list_footer(
  props: &ListFooterProps
) -> Html {
  let locale = use_context::<LocaleContext>()
    .map(|ctx| ctx.locale)
    .unwrap_or_default();
  let range =
    row_range(props.pagination, props.total);
  let index = props.pagination.page_index;

  html! {
      <div class="footer">
          { page_size_select(locale, props.pagination, &props.on_change) }
          <span class="range">{ locale.showing_rows(range.from, range.to, range.total) }</span>
          <button class="btn ghost" disabled={index == 0} onclick={go_to(&props.on_change, index.saturating_sub(1))}>
              { "‹" }
          </button>
          <button class="btn ghost" disabled={range.to >= range.total} onclick={go_to(&props.on_change, index + 1)}>
              { "›" }
          </button>
      </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct GridFooterProps {
  pub pagination:  Pagination,
  pub total_pages: u64,
  pub on_change:   Callback<FilterChange>
}

#[function_component(GridFooter)]
pub fn grid_footer(
  props: &GridFooterProps
) -> Html {
  let locale = use_context::<LocaleContext>()
    .map(|ctx| ctx.locale)
    .unwrap_or_default();
  let index = props.pagination.page_index;
  let pages = props.total_pages.max(1);
  let last = pages - 1;

  html! {
      <div class="footer grid-footer">
          { page_size_select(locale, props.pagination, &props.on_change) }
          <button class="btn ghost" disabled={index == 0} onclick={go_to(&props.on_change, 0)}>{ "«" }</button>
          <button class="btn ghost" disabled={index == 0} onclick={go_to(&props.on_change, index.saturating_sub(1))}>{ "‹" }</button>
          <span class="range">{ locale.page_of(index + 1, pages) }</span>
          <button class="btn ghost" disabled={index >= last} onclick={go_to(&props.on_change, index + 1)}>{ "›" }</button>
          <button class="btn ghost" disabled={index >= last} onclick={go_to(&props.on_change, last)}>{ "»" }</button>
      </div>
  }
}
