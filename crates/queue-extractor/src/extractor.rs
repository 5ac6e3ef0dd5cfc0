//! Extraction pass over the pending-work table

use crate::{
    config::ExtractorConfig,
    errors::ExtractionError,
    models::{ActionHandle, WorkItem},
};
use action_locator::{CandidateSet, ElementResolver};
use action_primitives::{
    ActionError, BrowserSession, Element, PresenceCondition, Query, SearchRoot,
};
use async_trait::async_trait;
use perceiver_state::StateDetector;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Source of work items for the orchestrator
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Parse the live table into pending items, in table order.
    ///
    /// An empty vector means the queue is drained.
    async fn extract(&self, session: &dyn BrowserSession) -> Result<Vec<WorkItem>, ExtractionError>;

    /// Find `item`'s action control again in the live page, by the row
    /// whose text contains both its subject and counterparty.
    async fn relocate_action(
        &self,
        session: &dyn BrowserSession,
        item: &WorkItem,
    ) -> Result<Element, ExtractionError>;
}

/// Table-backed work queue
pub struct WorkItemExtractor {
    config: ExtractorConfig,
    resolver: Arc<dyn ElementResolver>,
    detector: Arc<dyn StateDetector>,
}

impl WorkItemExtractor {
    pub fn new(
        config: ExtractorConfig,
        resolver: Arc<dyn ElementResolver>,
        detector: Arc<dyn StateDetector>,
    ) -> Self {
        Self {
            config,
            resolver,
            detector,
        }
    }

    async fn locate_table(&self, session: &dyn BrowserSession) -> Result<Element, ExtractionError> {
        self.resolver
            .resolve(
                session,
                SearchRoot::Document,
                &self.config.table,
                PresenceCondition::Present,
                self.config.table_timeout(),
            )
            .await
            .map(|resolution| {
                debug!(candidate = %resolution.query, "Located work item table");
                resolution.element
            })
            .map_err(|err| ExtractionError::TableUnreachable(err.to_string()))
    }

    async fn enumerate_rows(&self, table: &Element) -> Vec<Element> {
        for query in self.config.rows.iter() {
            match table.find_all(query).await {
                Ok(rows) if !rows.is_empty() => return rows,
                Ok(_) => {}
                Err(err) => debug!(query = %query, error = %err, "Row query failed"),
            }
        }
        Vec::new()
    }

    /// Text of a fixed-position cell; absent or blank cells yield `None`.
    async fn cell_text(row: &Element, query: &Query) -> Result<Option<String>, ActionError> {
        match row.find(query).await? {
            Some(cell) => {
                let text = cell.text().await?;
                let text = text.trim();
                Ok((!text.is_empty()).then(|| text.to_string()))
            }
            None => Ok(None),
        }
    }

    async fn find_action(
        &self,
        session: &dyn BrowserSession,
        row: &Element,
    ) -> Result<Option<Element>, ActionError> {
        let Some(cell) = row.find(&self.config.layout.action_cell).await? else {
            debug!(row = %row.describe(), "Action cell missing");
            return Ok(None);
        };
        Ok(self
            .resolver
            .resolve_now(
                session,
                SearchRoot::Element(&cell),
                &self.config.action,
                PresenceCondition::Present,
            )
            .await
            .ok()
            .map(|resolution| resolution.element))
    }

    async fn parse_row(
        &self,
        session: &dyn BrowserSession,
        row: &Element,
        row_number: usize,
    ) -> Result<WorkItem, ActionError> {
        let layout = &self.config.layout;
        let defaults = &self.config.defaults;

        let sequence_label = Self::cell_text(row, &layout.sequence)
            .await?
            .unwrap_or_else(|| row_number.to_string());
        let group_label = Self::cell_text(row, &layout.group)
            .await?
            .unwrap_or_else(|| defaults.group.clone());
        let combined = Self::cell_text(row, &layout.combined).await?.unwrap_or_default();
        let (subject_name, counterparty_name) = self.split_combined(&combined);
        let weight = Self::cell_text(row, &layout.weight)
            .await?
            .unwrap_or_else(|| defaults.weight.clone());
        let period = Self::cell_text(row, &layout.period)
            .await?
            .unwrap_or_else(|| defaults.period.clone());
        let action = self.find_action(session, row).await?;
        if action.is_none() {
            debug!(row = row_number, "No action control in row");
        }

        Ok(WorkItem {
            sequence_label,
            group_label,
            subject_name,
            counterparty_name,
            weight,
            period,
            action: ActionHandle::new(action),
        })
    }

    fn split_combined(&self, combined: &str) -> (String, String) {
        let defaults = &self.config.defaults;
        let mut parts = combined.split(self.config.delimiter.as_str()).map(str::trim);
        let subject = parts
            .next()
            .filter(|part| !part.is_empty())
            .map_or_else(|| defaults.subject.clone(), str::to_string);
        let counterparty = parts
            .next()
            .filter(|part| !part.is_empty())
            .map_or_else(|| defaults.counterparty.clone(), str::to_string);
        (subject, counterparty)
    }
}

#[async_trait]
impl WorkQueue for WorkItemExtractor {
    async fn extract(&self, session: &dyn BrowserSession) -> Result<Vec<WorkItem>, ExtractionError> {
        info!("Parsing work item list");

        if self.detector.is_queue_exhausted(session).await {
            info!("Completion banner shown, every item is done");
            return Ok(Vec::new());
        }

        let table = match self.locate_table(session).await {
            Ok(table) => table,
            Err(err) => {
                if self.detector.is_queue_exhausted(session).await {
                    info!("Completion banner appeared while locating the table");
                    return Ok(Vec::new());
                }
                let diagnostics = self.detector.snapshot(session).await;
                warn!(%diagnostics, error = %err, "Work item table unreachable");
                return Err(err);
            }
        };

        let rows = self.enumerate_rows(&table).await;
        info!(rows = rows.len(), "Table rows found");
        if rows.is_empty() {
            info!("Table has no data rows, every item is done");
            return Ok(Vec::new());
        }

        let mut items = Vec::new();
        let mut skipped = 0usize;
        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 1;
            match self.parse_row(session, row, row_number).await {
                Ok(item) => {
                    if item.needs_action().await {
                        debug!(row = row_number, item = %item, "Pending item");
                        items.push(item);
                    } else {
                        debug!(row = row_number, item = %item, "Row needs no action");
                    }
                }
                Err(err) => {
                    skipped += 1;
                    warn!(row = row_number, error = %err, "Row parse failed, skipping");
                }
            }
        }

        info!(
            pending = items.len(),
            rows = rows.len(),
            skipped,
            "Extraction complete"
        );
        for (position, item) in items.iter().enumerate() {
            info!("  {}. {}", position + 1, item.summary());
        }
        Ok(items)
    }

    async fn relocate_action(
        &self,
        session: &dyn BrowserSession,
        item: &WorkItem,
    ) -> Result<Element, ExtractionError> {
        let not_found = |reason: String| ExtractionError::ActionNotFound {
            item: format!("{} - {}", item.subject_name, item.counterparty_name),
            reason,
        };

        let table = self
            .locate_table(session)
            .await
            .map_err(|err| not_found(err.to_string()))?;
        let row_query = Query::text_contains(
            self.config.row_tag.clone(),
            [item.subject_name.clone(), item.counterparty_name.clone()],
        );
        let row_set = CandidateSet::new("item_row", [row_query.clone()]);
        let first = self
            .resolver
            .resolve(
                session,
                SearchRoot::Element(&table),
                &row_set,
                PresenceCondition::Present,
                self.config.relocate_timeout(),
            )
            .await
            .map_err(|err| not_found(err.to_string()))?
            .element;

        // Duplicate rows for the same pair: take the first one still actionable
        let rows = match SearchRoot::Element(&table).find_all(session, &row_query).await {
            Ok(rows) if !rows.is_empty() => rows,
            _ => vec![first],
        };
        let mut last_miss = None;
        for row in rows.iter() {
            match self
                .resolver
                .resolve_now(
                    session,
                    SearchRoot::Element(row),
                    &self.config.action,
                    PresenceCondition::Visible,
                )
                .await
            {
                Ok(control) => {
                    debug!(item = %item, control = %control.element.describe(), "Action control re-resolved");
                    return Ok(control.element);
                }
                Err(err) => {
                    trace!(item = %item, row = %row.describe(), error = %err, "Row has no visible action");
                    last_miss = Some(err);
                }
            }
        }
        Err(not_found(match last_miss {
            Some(err) => format!("{} matching row(s), none actionable: {}", rows.len(), err),
            None => "no matching row".to_string(),
        }))
    }
}
