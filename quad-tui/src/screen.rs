//! The generic resource screen.
//!
//! One screen type serves every registered resource: the table, the form,
//! and the create/update/delete mutations are all driven by the resource's
//! [`ResourceSpec`]. Mounting the screen binds the list query; the bindings
//! drop with the screen when the user navigates away.

use crate::keys::Action;
use quad_client::{
    BoundMutation, BoundQuery, CacheKey, ClientError, QueryCache, QueryStatus, RequestDescriptor,
};
use quad_core::datetime::{ensure_utc_suffix, local_datetime_value};
use quad_core::schema::{validate_record, FieldKind, FieldSpec, ResourceSpec, ValidationError};
use serde_json::{json, Map, Value};
use tracing::info;
use tui_textarea::TextArea;

/// One field's editor inside an open form.
pub enum FieldEditor {
    Text(TextArea<'static>),
    Bool(bool),
}

pub struct FormField {
    pub spec: &'static FieldSpec,
    pub editor: FieldEditor,
    pub error: Option<ValidationError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Holds the stringified identifier of the record being edited.
    Edit { id: String },
}

pub struct FormState {
    pub mode: FormMode,
    pub fields: Vec<FormField>,
    pub focus: usize,
}

impl FormState {
    fn create(spec: &'static ResourceSpec) -> Self {
        let fields = spec
            .fields
            .iter()
            .map(|field| FormField {
                spec: field,
                editor: empty_editor(field),
                error: None,
            })
            .collect();
        Self {
            mode: FormMode::Create,
            fields,
            focus: 0,
        }
    }

    fn edit(spec: &'static ResourceSpec, id: String, record: &Value) -> Self {
        let fields = spec
            .fields
            .iter()
            .map(|field| FormField {
                spec: field,
                editor: prefilled_editor(field, record.get(field.name)),
                error: None,
            })
            .collect();
        Self {
            mode: FormMode::Edit { id },
            fields,
            focus: 0,
        }
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = self.focus.checked_sub(1).unwrap_or(self.fields.len() - 1);
        }
    }

    /// Feed an uninterpreted key to the focused editor. Space toggles a
    /// boolean; everything else goes to the textarea.
    pub fn input(&mut self, key: crossterm::event::KeyEvent) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            match &mut field.editor {
                FieldEditor::Text(area) => {
                    area.input(key);
                }
                FieldEditor::Bool(value) => {
                    if matches!(
                        key.code,
                        crossterm::event::KeyCode::Char(' ') | crossterm::event::KeyCode::Enter
                    ) {
                        *value = !*value;
                    }
                }
            }
        }
    }

    /// Assemble the current editor contents into a wire-shaped record.
    /// Datetimes are normalized to the UTC-suffixed form.
    pub fn record(&self) -> Value {
        let mut map = Map::new();
        for field in &self.fields {
            let value = match &field.editor {
                FieldEditor::Bool(b) => Value::Bool(*b),
                FieldEditor::Text(area) => {
                    let text = area.lines().join("\n");
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    match field.spec.kind {
                        FieldKind::DateTime => Value::String(ensure_utc_suffix(text)),
                        _ => Value::String(text.to_string()),
                    }
                }
            };
            map.insert(field.spec.name.to_string(), value);
        }
        Value::Object(map)
    }

    fn apply_errors(&mut self, errors: &[ValidationError]) {
        for field in &mut self.fields {
            field.error = errors.iter().find(|e| e.field() == field.spec.name).cloned();
        }
    }

    /// The first field error, for the footer.
    pub fn first_error(&self) -> Option<&ValidationError> {
        self.fields.iter().find_map(|f| f.error.as_ref())
    }
}

fn empty_editor(field: &'static FieldSpec) -> FieldEditor {
    match field.kind {
        FieldKind::Bool => FieldEditor::Bool(false),
        _ => FieldEditor::Text(TextArea::default()),
    }
}

fn prefilled_editor(field: &'static FieldSpec, value: Option<&Value>) -> FieldEditor {
    match field.kind {
        FieldKind::Bool => FieldEditor::Bool(value.and_then(Value::as_bool).unwrap_or(false)),
        FieldKind::DateTime => {
            let text = value
                .and_then(Value::as_str)
                .map(local_datetime_value)
                .unwrap_or_default();
            FieldEditor::Text(TextArea::from(text.lines()))
        }
        _ => {
            let text = match value {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => String::new(),
            };
            FieldEditor::Text(TextArea::from(text.lines()))
        }
    }
}

/// What a form submission produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; the form stays open with per-field errors set.
    Invalid,
    Created,
    Updated,
}

pub struct ResourceScreen {
    pub spec: &'static ResourceSpec,
    cache: QueryCache,
    query: BoundQuery,
    create: BoundMutation<Value>,
    update: BoundMutation<(String, Value)>,
    remove: BoundMutation<String>,
    pub selected: usize,
    pub form: Option<FormState>,
    /// Cache key of the canonical record fetched for the open edit form,
    /// invalidated (and thereby dropped) when the form closes.
    edit_key: Option<CacheKey>,
    /// Whether create/edit/delete are offered (admin only).
    pub can_write: bool,
    /// Last request failure shown in the screen's error region.
    pub error: Option<String>,
}

impl ResourceScreen {
    pub fn mount(cache: &QueryCache, spec: &'static ResourceSpec, can_write: bool) -> Self {
        let list_key = CacheKey::from_path(spec.list_url());
        let query = BoundQuery::mount(
            cache,
            list_key.clone(),
            RequestDescriptor::get(spec.list_url()),
            json!([]),
        );

        let create = BoundMutation::new(
            cache,
            move |record: &Value| {
                let mut descriptor = RequestDescriptor::post(spec.post_url());
                for field in spec.fields {
                    if let Some(value) = record.get(field.name) {
                        descriptor = descriptor.with_param(field.name, param_value(value));
                    }
                }
                descriptor
            },
            vec![list_key.clone()],
        );

        // The identifier travels as a param; the body carries only the
        // mutable fields (orgCode is itself a form field and stays there).
        let update = BoundMutation::new(
            cache,
            move |(id, record): &(String, Value)| {
                RequestDescriptor::put(spec.item_url())
                    .with_param(spec.id_field, id.clone())
                    .with_body(record.clone())
            },
            vec![list_key],
        );

        // Deletes re-read the canonical list via refresh() instead of
        // invalidating, so the invalidation set is empty.
        let remove = BoundMutation::new(
            cache,
            move |id: &String| {
                RequestDescriptor::delete(spec.item_url()).with_param(spec.id_field, id.clone())
            },
            Vec::new(),
        );

        Self {
            spec,
            cache: cache.clone(),
            query,
            create,
            update,
            remove,
            selected: 0,
            form: None,
            edit_key: None,
            can_write,
            error: None,
        }
    }

    pub fn rows(&self) -> Vec<Value> {
        match self.query.data() {
            Value::Array(rows) => rows,
            _ => Vec::new(),
        }
    }

    pub fn status(&self) -> QueryStatus {
        self.query.status()
    }

    pub fn query_error(&self) -> Option<ClientError> {
        self.query.error()
    }

    pub fn selected_record(&self) -> Option<Value> {
        self.rows().get(self.selected).cloned()
    }

    pub fn select_next(&mut self) {
        let len = self.rows().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn select_previous(&mut self) {
        let len = self.rows().len();
        if len > 0 {
            self.selected = self.selected.checked_sub(1).unwrap_or(len - 1);
        }
    }

    /// Wait for the next cache change affecting the bound list.
    pub async fn changed(&mut self) {
        self.query.changed().await;
    }

    pub fn take_change(&mut self) -> bool {
        self.query.take_change()
    }

    pub async fn refresh(&mut self) {
        self.error = None;
        if let Err(err) = self.query.refresh().await {
            self.error = Some(err.to_string());
        }
        self.clamp_selection();
    }

    pub fn open_create(&mut self) -> bool {
        if !self.can_write {
            return false;
        }
        self.form = Some(FormState::create(self.spec));
        true
    }

    /// Open the edit form for the selected row, prefilled from the server's
    /// canonical record (`GET {base}?id=`), not the possibly stale list row.
    pub async fn open_edit(&mut self) -> bool {
        if !self.can_write {
            return false;
        }
        let Some(row) = self.selected_record() else {
            return false;
        };
        let Some(id) = row.get(self.spec.id_field).map(param_value) else {
            return false;
        };
        let key = CacheKey::with_id(self.spec.item_url(), id.clone());
        let descriptor =
            RequestDescriptor::get(self.spec.item_url()).with_param(self.spec.id_field, id.clone());
        let record = match self.cache.fetch(&key, &descriptor).await {
            Ok(record) => record,
            Err(err) => {
                self.error = Some(err.to_string());
                // The failed entry has no subscribers; drop it right away.
                self.cache.invalidate(&key).await;
                return false;
            }
        };
        self.edit_key = Some(key);
        self.form = Some(FormState::edit(self.spec, id, &record));
        true
    }

    /// Close the form and drop the canonical-record entry it was prefilled
    /// from (the item key has no subscribers, so invalidating removes it).
    pub async fn close_form(&mut self) {
        self.form = None;
        if let Some(key) = self.edit_key.take() {
            self.cache.invalidate(&key).await;
        }
    }

    /// Validate and submit the open form. On success the form closes and
    /// the list key is invalidated by the mutation; on a request failure
    /// the form stays open and the error lands in the screen's error
    /// region.
    pub async fn submit_form(&mut self) -> Result<SubmitOutcome, ClientError> {
        let Some(form) = &mut self.form else {
            return Err(ClientError::Config("no form open".to_string()));
        };

        let record = form.record();
        if let Err(errors) = validate_record(self.spec, &record) {
            form.apply_errors(&errors);
            return Ok(SubmitOutcome::Invalid);
        }
        form.apply_errors(&[]);

        let outcome = match form.mode.clone() {
            FormMode::Create => {
                self.error = None;
                self.create.mutate(&record).await.map(|_| {
                    info!(resource = self.spec.key, "record created");
                    SubmitOutcome::Created
                })
            }
            FormMode::Edit { id } => {
                self.error = None;
                self.update.mutate(&(id, record)).await.map(|_| {
                    info!(resource = self.spec.key, "record updated");
                    SubmitOutcome::Updated
                })
            }
        };

        match outcome {
            Ok(result) => {
                self.close_form().await;
                Ok(result)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Delete the selected record, then re-read the canonical list from the
    /// server. The row is never removed optimistically.
    pub async fn delete_selected(&mut self) -> Result<(), ClientError> {
        let Some(record) = self.selected_record() else {
            return Err(ClientError::Config("nothing selected".to_string()));
        };
        let id = record
            .get(self.spec.id_field)
            .map(param_value)
            .ok_or_else(|| ClientError::Config("record has no identifier".to_string()))?;

        self.error = None;
        match self.remove.mutate(&id).await {
            Ok(_) => {
                info!(resource = self.spec.key, id = %id, "record deleted");
                if let Err(err) = self.query.refresh().await {
                    self.error = Some(err.to_string());
                }
                self.clamp_selection();
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Route a browse-mode action that belongs to this screen. Returns the
    /// notification text to show, if any.
    pub async fn handle_action(&mut self, action: Action) -> Option<String> {
        match action {
            Action::MoveDown => {
                self.select_next();
                None
            }
            Action::MoveUp => {
                self.select_previous();
                None
            }
            Action::Refresh => {
                self.refresh().await;
                None
            }
            Action::NewItem => {
                if !self.open_create() {
                    return Some("Not permitted.".to_string());
                }
                None
            }
            Action::EditItem => {
                if !self.open_edit().await {
                    return Some(if self.can_write {
                        "Nothing selected.".to_string()
                    } else {
                        "Not permitted.".to_string()
                    });
                }
                None
            }
            Action::DeleteItem => {
                if !self.can_write {
                    return Some("Not permitted.".to_string());
                }
                match self.delete_selected().await {
                    Ok(()) => Some("Deleted.".to_string()),
                    Err(err) => Some(format!("Delete failed: {err}")),
                }
            }
            _ => None,
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

/// Stringify a JSON value for use as a query parameter.
fn param_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
