use serde_json::Value;
use taskdesk_core::filter_state::{FilterChange, FilterFn, FilterState, FilterValue, DATE_FIELDS};
use taskdesk_core::table::FilterVariant;
use yew::{AttrValue, Callback, Event, Html, Properties, TargetCast, function_component, html};

#[derive(Properties, PartialEq)]
pub struct ColumnFilterCellProps {
    pub id: AttrValue,
    pub variant: FilterVariant,
    pub filter: FilterState,
    pub on_change: Callback<FilterChange>,
}

fn text_of(value: Option<&FilterValue>) -> String {
    match value {
        Some(FilterValue::Text(text)) => text.clone(),
        Some(FilterValue::Number(number)) => number.to_string(),
        Some(FilterValue::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

fn bounds_of(value: Option<&FilterValue>) -> (String, String) {
    let Some(FilterValue::List(items)) = value else {
        return (String::new(), String::new());
    };
    let at = |idx: usize| items.get(idx).and_then(Value::as_str).unwrap_or_default().to_string();
    (at(0), at(1))
}

/// Filter input for one column plus, for non-date columns, the operator
/// picker.
#[function_component(ColumnFilterCell)]
pub fn column_filter_cell(props: &ColumnFilterCellProps) -> Html {
    let id = props.id.to_string();
    let current = props.filter.column_filter(&id);

    let set_value = {
        let on_change = props.on_change.clone();
        let id = id.clone();
        move |value: FilterValue| {
            on_change.emit(FilterChange::ColumnFilter {
                id: id.clone(),
                value: Some(value),
            })
        }
    };

    let is_date = DATE_FIELDS.contains(&id.as_str());
    let selected_fn = props.filter.filter_fn_for(&id).cloned().unwrap_or(FilterFn::Contains);

    let input = match &props.variant {
        _ if !is_date && !selected_fn.takes_value() => html! {},
        FilterVariant::Text => {
            let set_value = set_value.clone();
            let onchange = Callback::from(move |e: Event| {
                let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                set_value(FilterValue::Text(input.value()));
            });
            html! { <input class="filter" type="text" value={text_of(current)} {onchange} /> }
        }
        FilterVariant::Select(options) => {
            let set_value = set_value.clone();
            let selected = text_of(current);
            let onchange = Callback::from(move |e: Event| {
                let select: web_sys::HtmlSelectElement = e.target_unchecked_into();
                set_value(FilterValue::Text(select.value()));
            });
            html! {
                <select class="filter" {onchange}>
                    <option value="" selected={selected.is_empty()}>{ "" }</option>
                    {
                        for options.iter().map(|option| html! {
                            <option value={option.clone()} selected={*option == selected}>{ option.clone() }</option>
                        })
                    }
                </select>
            }
        }
        FilterVariant::DateRange => {
            let (from, to) = bounds_of(current);
            let on_from = {
                let set_value = set_value.clone();
                let to = to.clone();
                Callback::from(move |e: Event| {
                    let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                    set_value(FilterValue::range(input.value(), to.clone()));
                })
            };
            let on_to = {
                let set_value = set_value.clone();
                let from = from.clone();
                Callback::from(move |e: Event| {
                    let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                    set_value(FilterValue::range(from.clone(), input.value()));
                })
            };
            html! {
                <div class="date-range">
                    <input type="date" value={from} onchange={on_from} />
                    <input type="date" value={to} onchange={on_to} />
                </div>
            }
        }
    };

    let operator = if is_date {
        html! {}
    } else {
        let on_change = props.on_change.clone();
        let id = id.clone();
        let onchange = Callback::from(move |e: Event| {
            let select: web_sys::HtmlSelectElement = e.target_unchecked_into();
            on_change.emit(FilterChange::ColumnFilterFn {
                id: id.clone(),
                filter_fn: FilterFn::from(select.value()),
            });
        });
        html! {
            <select class="filter-fn" {onchange}>
                {
                    for FilterFn::MENU.iter().map(|filter_fn| html! {
                        <option value={filter_fn.as_str().to_string()} selected={*filter_fn == selected_fn}>
                            { filter_fn.as_str().to_string() }
                        </option>
                    })
                }
            </select>
        }
    };

    html! {
        <div class="column-filter">
            { input }
            { operator }
        </div>
    }
}
