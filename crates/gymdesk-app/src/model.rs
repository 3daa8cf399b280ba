// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentStatus {
    Active,
    Inactive,
    Terminated,
}

impl EmploymentStatus {
    pub const ALL: [Self; 3] = [Self::Active, Self::Inactive, Self::Terminated];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Terminated => "terminated",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "terminated" => Some(Self::Terminated),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Terminated => "Terminated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipStatus {
    Active,
    Expired,
    Suspended,
}

impl MembershipStatus {
    pub const ALL: [Self; 3] = [Self::Active, Self::Expired, Self::Suspended];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Suspended => "suspended",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "expired" => Some(Self::Expired),
            "suspended" => Some(Self::Suspended),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Expired => "Expired",
            Self::Suspended => "Suspended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipPlan {
    Monthly,
    Quarterly,
    Annual,
}

impl MembershipPlan {
    pub const ALL: [Self; 3] = [Self::Monthly, Self::Quarterly, Self::Annual];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "annual" => Some(Self::Annual),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Annual => "Annual",
        }
    }

    pub const fn months(self) -> i64 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::Annual => 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentCategory {
    Cardio,
    Strength,
    FreeWeights,
    Accessories,
}

impl EquipmentCategory {
    pub const ALL: [Self; 4] = [
        Self::Cardio,
        Self::Strength,
        Self::FreeWeights,
        Self::Accessories,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cardio => "cardio",
            Self::Strength => "strength",
            Self::FreeWeights => "free_weights",
            Self::Accessories => "accessories",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cardio" => Some(Self::Cardio),
            "strength" => Some(Self::Strength),
            "free_weights" => Some(Self::FreeWeights),
            "accessories" => Some(Self::Accessories),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Cardio => "Cardio",
            Self::Strength => "Strength",
            Self::FreeWeights => "Free Weights",
            Self::Accessories => "Accessories",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentCondition {
    Good,
    NeedsRepair,
    OutOfService,
}

impl EquipmentCondition {
    pub const ALL: [Self; 3] = [Self::Good, Self::NeedsRepair, Self::OutOfService];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::NeedsRepair => "needs_repair",
            Self::OutOfService => "out_of_service",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "good" => Some(Self::Good),
            "needs_repair" => Some(Self::NeedsRepair),
            "out_of_service" => Some(Self::OutOfService),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::NeedsRepair => "Needs Repair",
            Self::OutOfService => "Out of Service",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    Supplements,
    Beverages,
    Apparel,
    Accessories,
}

impl ProductCategory {
    pub const ALL: [Self; 4] = [
        Self::Supplements,
        Self::Beverages,
        Self::Apparel,
        Self::Accessories,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Supplements => "supplements",
            Self::Beverages => "beverages",
            Self::Apparel => "apparel",
            Self::Accessories => "accessories",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "supplements" => Some(Self::Supplements),
            "beverages" => Some(Self::Beverages),
            "apparel" => Some(Self::Apparel),
            "accessories" => Some(Self::Accessories),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Supplements => "Supplements",
            Self::Beverages => "Beverages",
            Self::Apparel => "Apparel",
            Self::Accessories => "Accessories",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupplierStatus {
    Active,
    Inactive,
}

impl SupplierStatus {
    pub const ALL: [Self; 2] = [Self::Active, Self::Inactive];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Login,
    Logout,
}

impl AuditAction {
    pub const ALL: [Self; 5] = [
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::Login,
        Self::Logout,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Login => "login",
            Self::Logout => "logout",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            "login" => Some(Self::Login),
            "logout" => Some(Self::Logout),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Login => "Login",
            Self::Logout => "Logout",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenKind {
    Employees,
    Members,
    Equipment,
    Products,
    Suppliers,
    AuditLog,
}

impl ScreenKind {
    pub const ALL: [Self; 6] = [
        Self::Employees,
        Self::Members,
        Self::Equipment,
        Self::Products,
        Self::Suppliers,
        Self::AuditLog,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employees => "employees",
            Self::Members => "members",
            Self::Equipment => "equipment",
            Self::Products => "products",
            Self::Suppliers => "suppliers",
            Self::AuditLog => "audit_log",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "employees" => Some(Self::Employees),
            "members" => Some(Self::Members),
            "equipment" => Some(Self::Equipment),
            "products" => Some(Self::Products),
            "suppliers" => Some(Self::Suppliers),
            "audit_log" | "audit" => Some(Self::AuditLog),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Employees => "employees",
            Self::Members => "members",
            Self::Equipment => "equipment",
            Self::Products => "products",
            Self::Suppliers => "suppliers",
            Self::AuditLog => "audit log",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub email: String,
    pub phone: String,
    pub status: EmploymentStatus,
    pub hire_date: Date,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub plan: MembershipPlan,
    pub status: MembershipStatus,
    pub joined_on: Date,
    pub expires_on: Date,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: EquipmentId,
    pub name: String,
    pub category: EquipmentCategory,
    pub condition: EquipmentCondition,
    pub location: String,
    pub purchase_date: Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: ProductCategory,
    pub price_cents: i64,
    pub stock: i32,
    pub supplier_id: Option<SupplierId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub status: SupplierStatus,
    pub added_on: Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub actor: String,
    pub action: AuditAction,
    pub entity: String,
    pub details: String,
    pub occurred_at: OffsetDateTime,
}

pub fn format_date(value: Date) -> String {
    value
        .format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| "1970-01-01".to_owned())
}

pub fn format_timestamp(value: OffsetDateTime) -> String {
    value
        .format(&format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| "1970-01-01 00:00".to_owned())
}

pub fn format_money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let absolute = cents.unsigned_abs();
    let dollars = absolute / 100;
    let cents_component = absolute % 100;
    format!("{sign}${dollars}.{cents_component:02}")
}
