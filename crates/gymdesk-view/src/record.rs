// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use gymdesk_app::{
    AuditEntry, AuditEntryId, Employee, EmployeeId, EntityId, Equipment, EquipmentId, Member,
    MemberId, Product, ProductId, Supplier, SupplierId,
};

use crate::notifier::SelectionFlag;

pub trait Record: Clone + 'static {
    type Id: EntityId;

    fn id(&self) -> Self::Id;
}

/// A record as held by a controller: the domain data plus its selection flag.
#[derive(Debug, Clone)]
pub struct Row<R> {
    record: R,
    selection: SelectionFlag,
}

impl<R: Record> Row<R> {
    pub fn new(record: R) -> Self {
        Self::with_flag(record, SelectionFlag::default())
    }

    pub fn with_flag(record: R, selection: SelectionFlag) -> Self {
        Self { record, selection }
    }

    pub fn id(&self) -> R::Id {
        self.record.id()
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    pub fn selection(&self) -> &SelectionFlag {
        &self.selection
    }

    pub fn is_selected(&self) -> bool {
        self.selection.get()
    }
}

macro_rules! record_id {
    ($record:ty, $id:ty) => {
        impl Record for $record {
            type Id = $id;

            fn id(&self) -> Self::Id {
                self.id
            }
        }
    };
}

record_id!(Employee, EmployeeId);
record_id!(Member, MemberId);
record_id!(Equipment, EquipmentId);
record_id!(Product, ProductId);
record_id!(Supplier, SupplierId);
record_id!(AuditEntry, AuditEntryId);
