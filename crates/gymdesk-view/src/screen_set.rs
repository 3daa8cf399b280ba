// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use gymdesk_app::{
    AuditEntry, Employee, EntityId, Equipment, Member, Product, ScreenKind, Supplier,
};
use std::collections::BTreeSet;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::bus::{DataEvent, EventBus};
use crate::controller::CollectionController;
use crate::screens::{
    AuditLogScreen, EmployeesScreen, EquipmentScreen, MembersScreen, ProductsScreen,
    SuppliersScreen,
};
use crate::search::InlineDispatcher;
use crate::selection::SelectionAggregate;

/// One screen's worth of records as handed over by a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dataset {
    Employees(Vec<Employee>),
    Members(Vec<Member>),
    Equipment(Vec<Equipment>),
    Products(Vec<Product>),
    Suppliers(Vec<Supplier>),
    AuditLog(Vec<AuditEntry>),
}

impl Dataset {
    pub fn empty(screen: ScreenKind) -> Self {
        match screen {
            ScreenKind::Employees => Self::Employees(Vec::new()),
            ScreenKind::Members => Self::Members(Vec::new()),
            ScreenKind::Equipment => Self::Equipment(Vec::new()),
            ScreenKind::Products => Self::Products(Vec::new()),
            ScreenKind::Suppliers => Self::Suppliers(Vec::new()),
            ScreenKind::AuditLog => Self::AuditLog(Vec::new()),
        }
    }

    pub const fn screen(&self) -> ScreenKind {
        match self {
            Self::Employees(_) => ScreenKind::Employees,
            Self::Members(_) => ScreenKind::Members,
            Self::Equipment(_) => ScreenKind::Equipment,
            Self::Products(_) => ScreenKind::Products,
            Self::Suppliers(_) => ScreenKind::Suppliers,
            Self::AuditLog(_) => ScreenKind::AuditLog,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Employees(rows) => rows.len(),
            Self::Members(rows) => rows.len(),
            Self::Equipment(rows) => rows.len(),
            Self::Products(rows) => rows.len(),
            Self::Suppliers(rows) => rows.len(),
            Self::AuditLog(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// External persistence boundary. The view layer never stores anything
/// itself; it reads whole datasets and forwards delete requests.
pub trait DataSource {
    fn fetch(&mut self, screen: ScreenKind) -> Result<Dataset>;

    fn delete(&mut self, screen: ScreenKind, ids: &[i64]) -> Result<()>;
}

/// Screens whose rows are derived from or reference rows on `screen`.
pub fn dependents(screen: ScreenKind) -> &'static [ScreenKind] {
    match screen {
        ScreenKind::Suppliers => &[ScreenKind::Products, ScreenKind::AuditLog],
        ScreenKind::AuditLog => &[],
        _ => &[ScreenKind::AuditLog],
    }
}

macro_rules! with_controller {
    (ref $set:expr, $screen:expr, $controller:ident => $body:expr) => {
        with_controller!(@bind [&] $set, $screen, $controller => $body)
    };
    (@bind [$($borrow:tt)+] $set:expr, $screen:expr, $controller:ident => $body:expr) => {
        match $screen {
            ScreenKind::Employees => {
                let $controller = $($borrow)+ $set.employees;
                $body
            }
            ScreenKind::Members => {
                let $controller = $($borrow)+ $set.members;
                $body
            }
            ScreenKind::Equipment => {
                let $controller = $($borrow)+ $set.equipment;
                $body
            }
            ScreenKind::Products => {
                let $controller = $($borrow)+ $set.products;
                $body
            }
            ScreenKind::Suppliers => {
                let $controller = $($borrow)+ $set.suppliers;
                $body
            }
            ScreenKind::AuditLog => {
                let $controller = $($borrow)+ $set.audit_log;
                $body
            }
        }
    };
    ($set:expr, $screen:expr, $controller:ident => $body:expr) => {
        with_controller!(@bind [&mut] $set, $screen, $controller => $body)
    };
}

/// Every list screen of the application, wired to one shared event bus.
pub struct ScreenSet {
    pub employees: CollectionController<EmployeesScreen>,
    pub members: CollectionController<MembersScreen>,
    pub equipment: CollectionController<EquipmentScreen>,
    pub products: CollectionController<ProductsScreen>,
    pub suppliers: CollectionController<SuppliersScreen>,
    pub audit_log: CollectionController<AuditLogScreen>,
    bus: EventBus,
    events: Receiver<DataEvent>,
    stale: BTreeSet<ScreenKind>,
}

impl ScreenSet {
    /// Controllers whose searches resolve on worker threads after `latency`.
    pub fn new(bus: EventBus, latency: Duration) -> Self {
        let events = bus.subscribe();
        Self {
            employees: CollectionController::with_latency(bus.clone(), latency),
            members: CollectionController::with_latency(bus.clone(), latency),
            equipment: CollectionController::with_latency(bus.clone(), latency),
            products: CollectionController::with_latency(bus.clone(), latency),
            suppliers: CollectionController::with_latency(bus.clone(), latency),
            audit_log: CollectionController::with_latency(bus.clone(), latency),
            bus,
            events,
            stale: BTreeSet::new(),
        }
    }

    /// Controllers whose searches resolve on the calling thread.
    pub fn inline(bus: EventBus) -> Self {
        let events = bus.subscribe();
        Self {
            employees: CollectionController::new(bus.clone(), InlineDispatcher),
            members: CollectionController::new(bus.clone(), InlineDispatcher),
            equipment: CollectionController::new(bus.clone(), InlineDispatcher),
            products: CollectionController::new(bus.clone(), InlineDispatcher),
            suppliers: CollectionController::new(bus.clone(), InlineDispatcher),
            audit_log: CollectionController::new(bus.clone(), InlineDispatcher),
            bus,
            events,
            stale: BTreeSet::new(),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Fetches `screen` from `source` and loads it. A failed fetch still
    /// leaves the screen loaded, with no rows.
    pub fn reload(&mut self, screen: ScreenKind, source: &mut dyn DataSource) -> Result<usize> {
        let dataset = match source.fetch(screen) {
            Ok(dataset) => dataset,
            Err(error) => {
                tracing::warn!(
                    screen = screen.as_str(),
                    error = %format!("{error:#}"),
                    "fetch failed; showing an empty list"
                );
                self.load(Dataset::empty(screen));
                return Err(error.context(format!("load {}", screen.label())));
            }
        };
        if dataset.screen() != screen {
            bail!(
                "data source returned {} rows when asked for {}",
                dataset.screen().label(),
                screen.label()
            );
        }
        let count = dataset.len();
        self.load(dataset);
        Ok(count)
    }

    pub fn reload_all(&mut self, source: &mut dyn DataSource) -> Result<()> {
        for screen in ScreenKind::ALL {
            self.reload(screen, source)?;
        }
        Ok(())
    }

    pub fn load(&mut self, dataset: Dataset) {
        match dataset {
            Dataset::Employees(rows) => self.employees.load(rows),
            Dataset::Members(rows) => self.members.load(rows),
            Dataset::Equipment(rows) => self.equipment.load(rows),
            Dataset::Products(rows) => self.products.load(rows),
            Dataset::Suppliers(rows) => self.suppliers.load(rows),
            Dataset::AuditLog(rows) => self.audit_log.load(rows),
        }
    }

    /// Deletes the selected displayed rows of `screen`. The source is asked
    /// first; rows leave the controller only once it has succeeded.
    pub fn delete_selected(
        &mut self,
        screen: ScreenKind,
        source: &mut dyn DataSource,
    ) -> Result<Vec<i64>> {
        let ids = self.selected_ids(screen);
        if ids.is_empty() {
            return Ok(ids);
        }
        source
            .delete(screen, &ids)
            .with_context(|| format!("delete {} {} row(s)", ids.len(), screen.label()))?;
        let removed = with_controller!(self, screen, controller => {
            controller
                .remove_selected()
                .into_iter()
                .map(EntityId::get)
                .collect::<Vec<i64>>()
        });
        Ok(removed)
    }

    pub fn selected_ids(&self, screen: ScreenKind) -> Vec<i64> {
        with_controller!(ref self, screen, controller => {
            controller
                .selected_ids()
                .into_iter()
                .map(EntityId::get)
                .collect()
        })
    }

    pub fn aggregate(&self, screen: ScreenKind) -> SelectionAggregate {
        with_controller!(ref self, screen, controller => controller.aggregate())
    }

    /// Drains pending data events and reloads every screen that depends on
    /// a changed one. Returns the screens that were reloaded.
    ///
    /// Every stale screen is attempted even when one fails. Screens that
    /// fail stay stale and are retried by the next call.
    pub fn refresh_dependents(&mut self, source: &mut dyn DataSource) -> Result<Vec<ScreenKind>> {
        while let Ok(event) = self.events.try_recv() {
            if matches!(event, DataEvent::Loaded { .. }) {
                continue;
            }
            self.stale.extend(dependents(event.screen()).iter().copied());
        }

        let mut reloaded = Vec::with_capacity(self.stale.len());
        let mut failures = Vec::new();
        for screen in std::mem::take(&mut self.stale) {
            match self.reload(screen, source) {
                Ok(_) => reloaded.push(screen),
                Err(error) => failures.push((screen, error)),
            }
        }
        // Reloads publish Loaded events of their own; nothing depends on them.
        while self.events.try_recv().is_ok() {}

        if failures.is_empty() {
            return Ok(reloaded);
        }
        let messages = failures
            .iter()
            .map(|(_, error)| format!("{error:#}"))
            .collect::<Vec<_>>()
            .join("; ");
        self.stale.extend(failures.iter().map(|(screen, _)| *screen));
        bail!(
            "refresh {} of {} dependent screen(s) failed: {messages}",
            failures.len(),
            failures.len() + reloaded.len()
        )
    }

    /// Screens waiting for a successful refresh.
    pub fn stale_screens(&self) -> Vec<ScreenKind> {
        self.stale.iter().copied().collect()
    }

    pub fn dispose(&mut self) {
        self.employees.dispose();
        self.members.dispose();
        self.equipment.dispose();
        self.products.dispose();
        self.suppliers.dispose();
        self.audit_log.dispose();
        tracing::debug!("screens disposed");
    }
}
