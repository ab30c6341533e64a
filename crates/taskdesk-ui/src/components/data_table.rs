use std::rc::Rc;

use futures::future::LocalBoxFuture;
use serde::Serialize;
use taskdesk_core::export::{ExportFormat, export_rows};
use taskdesk_core::filter_state::{FilterChange, FilterState, ViewMode};
use taskdesk_core::i18n::Text;
use taskdesk_core::notify::Notification;
use taskdesk_core::remote::{BulkAction, BulkOutcome};
use taskdesk_core::table::{BulkReport, ColumnDef, TableController, TableRow, row_actions_enabled};
use taskdesk_shared::ListPage;
use yew::{
    Callback, Html, MouseEvent, Properties, Reducible, function_component, html, use_context, use_reducer,
};

use super::{ColumnFilterCell, ConfirmDialog, GridFooter, ListFooter, RowActions, ToolbarContext, TopToolbar};
use crate::api::download;
use crate::app::{LocaleContext, Services};

pub type BulkFuture = LocalBoxFuture<'static, Vec<BulkOutcome>>;

/// Runs a bulk action for the given ids and resolves once every request has
/// settled.
#[derive(Clone)]
pub struct BulkHandler(Rc<dyn Fn(BulkAction, Vec<String>) -> BulkFuture>);

impl BulkHandler {
    pub fn new(run: impl Fn(BulkAction, Vec<String>) -> BulkFuture + 'static) -> Self {
        Self(Rc::new(run))
    }

    fn run(&self, action: BulkAction, ids: Vec<String>) -> BulkFuture {
        (self.0)(action, ids)
    }
}

impl PartialEq for BulkHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Clone, PartialEq, Default)]
struct TableModel(TableController);

enum TableAction {
    Toggle(String),
    SetSelected(Vec<String>, bool),
    OpenConfirm,
    CloseConfirm,
    Completed(BulkAction, Vec<BulkOutcome>),
    Observe(FilterChange),
    Reset { was_trash: bool },
    ToggleExport,
    CloseExport,
}

impl Reducible for TableModel {
    type Action = TableAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        let table = &mut next.0;
        match action {
            TableAction::Toggle(id) => table.toggle_row(&id),
            TableAction::SetSelected(ids, selected) => table.set_selected(ids, selected),
            TableAction::OpenConfirm => table.open_confirm(),
            TableAction::CloseConfirm => table.close_confirm(),
            TableAction::Completed(action, outcomes) => {
                table.complete_bulk(action, &outcomes);
            }
            TableAction::Observe(change) => table.observe(&change),
            TableAction::Reset { was_trash } => table.after_reset(was_trash, false),
            TableAction::ToggleExport => table.toggle_export_menu(),
            TableAction::CloseExport => table.close_export_menu(),
        }
        Rc::new(next)
    }
}

fn toolbar_view(custom: Option<&Callback<ToolbarContext, Html>>, context: ToolbarContext) -> Html {
    match custom {
        Some(render) => render.emit(context),
        None => html! { <TopToolbar context={context} /> },
    }
}

#[derive(Properties, PartialEq)]
pub struct DataTableProps<R: PartialEq + 'static> {
    pub columns: Rc<Vec<ColumnDef<R>>>,
    /// Page currently on screen; kept while reloading.
    pub page: Option<ListPage<R>>,
    pub loading: bool,
    #[prop_or_default]
    pub error: Option<String>,
    pub filter: FilterState,
    pub on_change: Callback<FilterChange>,
    pub on_reset: Callback<()>,
    pub on_bulk: BulkHandler,
    /// `(id, edit)` for the per-row view and edit actions.
    pub on_open: Callback<(String, bool)>,
    /// Replaces the built-in toolbar.
    #[prop_or_default]
    pub render_toolbar: Option<Callback<ToolbarContext, Html>>,
    #[prop_or_default]
    pub render_row_actions: Option<Callback<R, Html>>,
    #[prop_or_default]
    pub render_grid_card: Option<Callback<R, Html>>,
    #[prop_or_default]
    pub disable_edit: Option<Callback<R, bool>>,
}

#[function_component(DataTable)]
pub fn data_table<R>(props: &DataTableProps<R>) -> Html
where
    R: TableRow + Clone + PartialEq + Serialize + 'static,
{
    let model = use_reducer(TableModel::default);
    let services = use_context::<Services>();
    let locale = use_context::<LocaleContext>().map(|ctx| ctx.locale).unwrap_or_default();

    let rows: Vec<R> = props.page.as_ref().map(|page| page.data.clone()).unwrap_or_default();
    let total = props.page.as_ref().map(|page| page.total).unwrap_or_default();
    let total_pages = props.page.as_ref().map(|page| page.total_pages).unwrap_or_default();
    let page_ids: Vec<String> = rows.iter().map(TableRow::row_id).collect();
    let table = &model.0;

    let on_change = {
        let model = model.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |change: FilterChange| {
            model.dispatch(TableAction::Observe(change.clone()));
            on_change.emit(change);
        })
    };

    let on_reset = {
        let model = model.clone();
        let on_reset = props.on_reset.clone();
        let was_trash = props.filter.is_trash;
        Callback::from(move |_: ()| {
            model.dispatch(TableAction::Reset { was_trash });
            on_reset.emit(());
        })
    };

    let on_export = {
        let model = model.clone();
        let rows = rows.clone();
        let services = services.clone();
        Callback::from(move |format: ExportFormat| {
            model.dispatch(TableAction::CloseExport);
            match export_rows(&rows, format) {
                Ok(file) => download(&file),
                Err(err) => {
                    tracing::error!(error = %err, ?format, "export failed");
                    if let Some(services) = &services {
                        services.0.notifier.notify(Notification::error(err.to_string()));
                    }
                }
            }
        })
    };

    let on_confirm = {
        let model = model.clone();
        let filter = props.filter.clone();
        let on_bulk = props.on_bulk.clone();
        let services = services.clone();
        Callback::from(move |_: ()| {
            let mut preview = model.0.clone();
            let Some((action, ids)) = preview.confirm(&filter) else {
                model.dispatch(TableAction::CloseConfirm);
                return;
            };
            model.dispatch(TableAction::CloseConfirm);
            let model = model.clone();
            let pending = on_bulk.run(action, ids);
            let notifier = services.as_ref().map(|services| services.0.notifier.clone());
            wasm_bindgen_futures::spawn_local(async move {
                let outcomes = pending.await;
                let report = BulkReport::from_outcomes(action, &outcomes);
                if let Some(notifier) = &notifier {
                    for notification in report.notifications(locale) {
                        notifier.notify(notification);
                    }
                }
                model.dispatch(TableAction::Completed(action, outcomes));
            });
        })
    };

    let on_open_confirm = {
        let model = model.clone();
        Callback::from(move |_: ()| model.dispatch(TableAction::OpenConfirm))
    };
    let on_close_confirm = {
        let model = model.clone();
        Callback::from(move |_: ()| model.dispatch(TableAction::CloseConfirm))
    };
    let on_toggle_export = {
        let model = model.clone();
        Callback::from(move |_: ()| model.dispatch(TableAction::ToggleExport))
    };

    let on_toggle_page = {
        let model = model.clone();
        let page_ids = page_ids.clone();
        let all = table.page_selected(&page_ids);
        Callback::from(move |_: MouseEvent| {
            model.dispatch(TableAction::SetSelected(page_ids.clone(), !all));
        })
    };

    let toggle_row = |id: String| {
        let model = model.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            model.dispatch(TableAction::Toggle(id.clone()));
        })
    };

    let actions_enabled = row_actions_enabled(&props.filter);
    let render_actions = |row: &R| -> Html {
        if let Some(render) = &props.render_row_actions {
            return render.emit(row.clone());
        }
        let editable = actions_enabled
            && !props
                .disable_edit
                .as_ref()
                .is_some_and(|disable| disable.emit(row.clone()));
        html! {
            <RowActions id={row.row_id()} editable={editable} on_open={props.on_open.clone()} />
        }
    };

    let body = match props.filter.view {
        ViewMode::List => {
            let sort_header = |column: &ColumnDef<R>| {
                let indicator = match props.filter.sort_for(column.id) {
                    Some(true) => " ▼",
                    Some(false) => " ▲",
                    None => "",
                };
                if column.sortable {
                    let on_change = on_change.clone();
                    let id = column.id.to_string();
                    html! {
                        <th class="sortable" onclick={move |_| on_change.emit(FilterChange::ToggleSort(id.clone()))}>
                            { format!("{}{indicator}", column.header) }
                        </th>
                    }
                } else {
                    html! { <th>{ column.header }</th> }
                }
            };

            html! {
                <table class="data-table">
                    <thead>
                        <tr>
                            <th class="select">
                                <input
                                    type="checkbox"
                                    checked={table.page_selected(&page_ids)}
                                    onclick={on_toggle_page.clone()}
                                />
                            </th>
                            { for props.columns.iter().map(sort_header) }
                            <th class="actions"></th>
                        </tr>
                        <tr class="filters">
                            <th></th>
                            {
                                for props.columns.iter().map(|column| html! {
                                    <th>
                                        <ColumnFilterCell
                                            id={column.id}
                                            variant={column.filter_variant.clone()}
                                            filter={props.filter.clone()}
                                            on_change={on_change.clone()}
                                        />
                                    </th>
                                })
                            }
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        {
                            if rows.is_empty() {
                                html! {
                                    <tr class="empty">
                                        <td colspan={(props.columns.len() + 2).to_string()}>
                                            { if props.loading { locale.text(Text::Loading) } else { locale.text(Text::NoRecords) } }
                                        </td>
                                    </tr>
                                }
                            } else {
                                html! {
                                    <>{ for rows.iter().map(|row| {
                                        let id = row.row_id();
                                        let checked = table.is_selected(&id);
                                        html! {
                                            <tr key={id.clone()} class={if checked { "row selected" } else { "row" }}>
                                                <td class="select">
                                                    <input type="checkbox" checked={checked} onclick={toggle_row(id.clone())} />
                                                </td>
                                                { for props.columns.iter().map(|column| html! { <td>{ (column.accessor)(row) }</td> }) }
                                                <td class="actions">{ render_actions(row) }</td>
                                            </tr>
                                        }
                                    }) }</>
                                }
                            }
                        }
                    </tbody>
                </table>
            }
        }
        ViewMode::Grid => html! {
            <div class="grid">
                <label class="select-all">
                    <input type="checkbox" checked={table.page_selected(&page_ids)} onclick={on_toggle_page.clone()} />
                    { locale.text(Text::SelectAll) }
                </label>
                {
                    if rows.is_empty() {
                        html! {
                            <div class="empty">
                                { if props.loading { locale.text(Text::Loading) } else { locale.text(Text::NoRecords) } }
                            </div>
                        }
                    } else {
                        html! {
                            <>{ for rows.iter().map(|row| {
                                let id = row.row_id();
                                let checked = table.is_selected(&id);
                                let card = match &props.render_grid_card {
                                    Some(render) => render.emit(row.clone()),
                                    None => html! {
                                        <dl>
                                            {
                                                for props.columns.iter().map(|column| html! {
                                                    <>
                                                        <dt>{ column.header }</dt>
                                                        <dd>{ (column.accessor)(row) }</dd>
                                                    </>
                                                })
                                            }
                                        </dl>
                                    },
                                };
                                html! {
                                    <div key={id.clone()} class={if checked { "card selected" } else { "card" }}>
                                        <input type="checkbox" checked={checked} onclick={toggle_row(id.clone())} />
                                        { card }
                                        <div class="card-actions">{ render_actions(row) }</div>
                                    </div>
                                }
                            }) }</>
                        }
                    }
                }
            </div>
        },
    };

    let footer = match props.filter.view {
        ViewMode::List => html! {
            <ListFooter pagination={props.filter.pagination} total={total} on_change={on_change.clone()} />
        },
        ViewMode::Grid => html! {
            <GridFooter pagination={props.filter.pagination} total_pages={total_pages} on_change={on_change.clone()} />
        },
    };

    let selected = table.selection().len();
    let bulk_action = BulkAction::for_trash_view(props.filter.is_trash);

    let toolbar_context = ToolbarContext {
        filter: props.filter.clone(),
        selected,
        bulk_action,
        export_open: table.export_menu_open(),
        on_change: on_change.clone(),
        on_reset,
        on_bulk: on_open_confirm,
        on_toggle_export,
        on_export,
    };
    let toolbar = toolbar_view(props.render_toolbar.as_ref(), toolbar_context);

    html! {
        <div class="panel data-table-panel" key={table.remount_key().to_string()}>
            { toolbar }
            {
                if props.loading {
                    html! { <div class="loading-bar">{ locale.text(Text::Loading) }</div> }
                } else {
                    html! {}
                }
            }
            {
                match &props.error {
                    Some(message) => html! { <div class="table-error">{ message.clone() }</div> },
                    None => html! {},
                }
            }
            { body }
            { footer }
            <ConfirmDialog
                open={table.confirm_open()}
                message={locale.bulk_confirm(bulk_action.is_restore(), selected)}
                on_confirm={on_confirm}
                on_cancel={on_close_confirm}
            />
        </div>
    }
}
