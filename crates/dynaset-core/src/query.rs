//! Query execution and parent-driven re-querying.

use dynaset_model::Row;
use tracing::{debug, debug_span, trace};

use crate::broadcast::Change;
use crate::database::QueryParams;
use crate::dynaset::DynasetId;
use crate::error::{DynasetError, Result};
use crate::graph::DynasetGraph;
use crate::view::DynasetView;

impl DynasetGraph {
    /// Run the dynaset's query with parameters derived from the parent.
    pub fn execute(&mut self, id: DynasetId) -> Result<usize> {
        self.execute_with(id, None)
    }

    /// Run the dynaset's query and replace its rows with the result.
    ///
    /// Without explicit parameters a child derives them from its parent's
    /// current row; when the parent has nothing selected the dynaset is
    /// cleared instead. The rows are cleared before the query runs, so a
    /// failing query leaves the dynaset empty. Returns the number of rows
    /// fetched.
    pub fn execute_with(&mut self, id: DynasetId, params: Option<QueryParams>) -> Result<usize> {
        let dynaset = self.get(id)?;
        let query = dynaset
            .query
            .clone()
            .ok_or_else(|| DynasetError::NoQuery {
                dynaset: dynaset.name.clone(),
            })?;
        let _span = debug_span!("execute", dynaset = %dynaset.name).entered();

        let params = match params {
            Some(params) => params,
            None => match self.derive_params(id)? {
                Some(params) => params,
                None => {
                    debug!("parent has no row selected, clearing instead");
                    self.clear(id)?;
                    return Ok(0);
                }
            },
        };

        self.clear(id)?;
        debug!(sql = %query, params = params.len(), "running query");
        trace!(?params, "query parameters");
        let result = self.database.query(&query, &params)?;

        let dynaset = self.get_mut(id)?;
        dynaset.columns.bind(&result.columns)?;
        let count = result.rows.len();
        dynaset
            .rows
            .replace_all(result.rows.into_iter().map(Row::fetched));
        dynaset.dirty = false;
        debug!(rows = count, "query fetched");

        self.data_changed(id, Change::Full)?;
        Ok(count)
    }

    /// Parameters taken from the parent's current row, one per linked column.
    ///
    /// A root dynaset gets an empty set. Returns `None` when the parent has no
    /// row selected.
    pub fn derive_params(&self, id: DynasetId) -> Result<Option<QueryParams>> {
        let dynaset = self.get(id)?;
        let Some(parent) = dynaset.parent else {
            return Ok(Some(QueryParams::new()));
        };
        let parent = self.get(parent)?;
        let Some(row) = parent.current_data_row().and_then(|row| parent.rows.get(row)) else {
            return Ok(None);
        };

        let mut params = QueryParams::new();
        for (column, link) in dynaset.columns.linked() {
            let ordinal = parent.columns.ordinal(link)?;
            let value = row.get(ordinal).cloned().unwrap_or_default();
            params.insert(dynaset.columns.meta(column).name(), value);
        }
        Ok(Some(params))
    }

    /// React to the parent's cursor having moved.
    pub(crate) fn parent_selection_changed(&mut self, id: DynasetId) -> Result<()> {
        let dynaset = self.get(id)?;
        if let Some(hook) = &dynaset.hooks.on_parent_changed {
            let view = DynasetView::new(self, id, dynaset);
            hook(&view).map_err(|source| DynasetError::Hook {
                dynaset: dynaset.name.clone(),
                hook: "on_parent_changed",
                source,
            })?;
        }
        if !dynaset.auto_execute {
            return Ok(());
        }
        if dynaset.query.is_none() {
            return self.clear(id);
        }
        self.execute(id)?;
        Ok(())
    }
}
