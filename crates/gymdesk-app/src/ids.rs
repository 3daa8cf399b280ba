// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Stable identity of a record within one screen's dataset.
pub trait EntityId: Copy + Eq + Ord + Hash + Debug + Send + 'static {
    fn get(self) -> i64;
}

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl EntityId for $name {
            fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(EmployeeId);
entity_id!(MemberId);
entity_id!(EquipmentId);
entity_id!(ProductId);
entity_id!(SupplierId);
entity_id!(AuditEntryId);
