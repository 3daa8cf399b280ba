// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use gymdesk_app::{AuditAction, AuditEntry, AuditEntryId, ScreenKind};
use gymdesk_testkit::DemoData;
use gymdesk_view::{DataSource, Dataset};
use time::OffsetDateTime;

const ACTOR: &str = "gymdesk-cli";

/// In-memory stand-in for the gym database, seeded from the demo generator.
/// Deletes are recorded in the audit log like the real back office does.
pub struct DemoSource {
    data: DemoData,
    clock: Box<dyn Fn() -> OffsetDateTime>,
}

impl DemoSource {
    pub fn new(data: DemoData) -> Self {
        Self::with_clock(data, Box::new(OffsetDateTime::now_utc))
    }

    pub fn with_clock(data: DemoData, clock: Box<dyn Fn() -> OffsetDateTime>) -> Self {
        Self { data, clock }
    }

    pub fn data(&self) -> &DemoData {
        &self.data
    }

    fn record_audit(&mut self, screen: ScreenKind, ids: &[i64]) {
        let next_id = self
            .data
            .audit_log
            .iter()
            .map(|entry| entry.id.get())
            .max()
            .unwrap_or(0)
            + 1;
        let listed = ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        self.data.audit_log.push(AuditEntry {
            id: AuditEntryId::new(next_id),
            actor: ACTOR.to_owned(),
            action: AuditAction::Delete,
            entity: screen.as_str().to_owned(),
            details: format!("deleted {} row(s): {listed}", ids.len()),
            occurred_at: (self.clock)(),
        });
    }
}

impl DataSource for DemoSource {
    fn fetch(&mut self, screen: ScreenKind) -> Result<Dataset> {
        let dataset = match screen {
            ScreenKind::Employees => Dataset::Employees(self.data.employees.clone()),
            ScreenKind::Members => Dataset::Members(self.data.members.clone()),
            ScreenKind::Equipment => Dataset::Equipment(self.data.equipment.clone()),
            ScreenKind::Products => Dataset::Products(self.data.products.clone()),
            ScreenKind::Suppliers => Dataset::Suppliers(self.data.suppliers.clone()),
            ScreenKind::AuditLog => Dataset::AuditLog(self.data.audit_log.clone()),
        };
        tracing::debug!(screen = screen.as_str(), rows = dataset.len(), "fetched");
        Ok(dataset)
    }

    fn delete(&mut self, screen: ScreenKind, ids: &[i64]) -> Result<()> {
        let keep = |id: i64| !ids.contains(&id);
        match screen {
            ScreenKind::Employees => self.data.employees.retain(|row| keep(row.id.get())),
            ScreenKind::Members => self.data.members.retain(|row| keep(row.id.get())),
            ScreenKind::Equipment => self.data.equipment.retain(|row| keep(row.id.get())),
            ScreenKind::Products => self.data.products.retain(|row| keep(row.id.get())),
            ScreenKind::Suppliers => {
                self.data.suppliers.retain(|row| keep(row.id.get()));
                for product in &mut self.data.products {
                    if product
                        .supplier_id
                        .is_some_and(|supplier| !keep(supplier.get()))
                    {
                        product.supplier_id = None;
                    }
                }
            }
            ScreenKind::AuditLog => bail!("the audit log is append-only"),
        }
        self.record_audit(screen, ids);
        Ok(())
    }
}
