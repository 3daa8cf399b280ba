// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! List-screen view layer: a Source → Filtered → Displayed pipeline per
//! screen with live multi-select counts and last-writer-wins search.

pub mod bus;
pub mod controller;
pub mod notifier;
pub mod record;
pub mod screen_set;
pub mod screens;
pub mod search;
pub mod selection;

pub use bus::{DataEvent, EventBus};
pub use controller::{CollectionController, ControllerState, RecordId, SharedRow, Upsert};
pub use notifier::{SelectionFlag, Subscription};
pub use record::{Record, Row};
pub use screen_set::{DataSource, Dataset, ScreenSet, dependents};
pub use screens::{
    AuditLogScreen, AuditSortKey, CategoryFilter, EmployeeSortKey, EmployeesScreen,
    EquipmentScreen, EquipmentSortKey, Keyword, MemberSortKey, MembersScreen, ProductSortKey,
    ProductsScreen, Screen, SortSpec, SupplierSortKey, SuppliersScreen, parse_category_filter,
    parse_sort_spec,
};
pub use search::{
    DEFAULT_SEARCH_LATENCY, InlineDispatcher, SearchDispatcher, SearchJob, SearchOutcome,
    SearchPoll, SearchStats, ThreadDispatcher,
};
pub use selection::{SelectAllState, SelectionAggregate};
