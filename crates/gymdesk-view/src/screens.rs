// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use gymdesk_app::{
    AuditAction, AuditEntry, Employee, EmploymentStatus, Equipment, EquipmentCategory, Member,
    MembershipStatus, Product, ProductCategory, ScreenKind, SortDirection, Supplier,
    SupplierStatus, format_date, format_money, format_timestamp,
};
use std::cmp::Ordering;
use std::fmt::Debug;

use crate::record::Record;

/// Category value for a screen: the `All` sentinel or one concrete category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryFilter<C> {
    All,
    Only(C),
}

impl<C> Default for CategoryFilter<C> {
    fn default() -> Self {
        Self::All
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortSpec<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K> SortSpec<K> {
    pub const fn asc(key: K) -> Self {
        Self {
            key,
            direction: SortDirection::Asc,
        }
    }

    pub const fn desc(key: K) -> Self {
        Self {
            key,
            direction: SortDirection::Desc,
        }
    }
}

/// Closed-set value with a stable lowercase spelling, the one `parse` accepts.
pub trait Keyword: Copy + Eq + Debug {
    fn keyword(self) -> &'static str;
}

macro_rules! keyword {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Keyword for $ty {
                fn keyword(self) -> &'static str {
                    self.as_str()
                }
            }
        )+
    };
}

keyword!(
    EmploymentStatus,
    MembershipStatus,
    EquipmentCategory,
    ProductCategory,
    SupplierStatus,
    AuditAction,
    EmployeeSortKey,
    MemberSortKey,
    EquipmentSortKey,
    ProductSortKey,
    SupplierSortKey,
    AuditSortKey,
);

/// Binds a record shape to its category predicate, sort keys and searchable
/// fields. One implementation per list screen.
pub trait Screen: 'static {
    const KIND: ScreenKind;

    type Record: Record;
    type Category: Keyword;
    type SortKey: Keyword;

    fn default_sort() -> SortSpec<Self::SortKey>;

    fn matches(category: Self::Category, record: &Self::Record) -> bool;

    /// Ascending order for `key`. Direction is applied by the caller.
    fn compare(key: Self::SortKey, left: &Self::Record, right: &Self::Record) -> Ordering;

    fn search_fields(record: &Self::Record) -> Vec<String>;

    fn parse_category(value: &str) -> Option<Self::Category>;

    fn parse_sort_key(value: &str) -> Option<Self::SortKey>;

    fn admits(filter: CategoryFilter<Self::Category>, record: &Self::Record) -> bool {
        match filter {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => Self::matches(category, record),
        }
    }

    fn ordering(
        spec: SortSpec<Self::SortKey>,
        left: &Self::Record,
        right: &Self::Record,
    ) -> Ordering {
        let order = Self::compare(spec.key, left, right);
        match spec.direction {
            SortDirection::Asc => order,
            SortDirection::Desc => order.reverse(),
        }
    }
}

/// Accepts `all` as the sentinel and defers everything else to the screen.
pub fn parse_category_filter<S: Screen>(value: &str) -> Option<CategoryFilter<S::Category>> {
    match value.trim().to_ascii_lowercase().as_str() {
        "all" => Some(CategoryFilter::All),
        other => S::parse_category(other).map(CategoryFilter::Only),
    }
}

/// Parses `key`, `key:asc` or `key:desc`.
pub fn parse_sort_spec<S: Screen>(value: &str) -> Option<SortSpec<S::SortKey>> {
    let lowered = value.trim().to_ascii_lowercase();
    let (key, direction) = match lowered.split_once(':') {
        Some((key, direction)) => (key, SortDirection::parse(direction)?),
        None => (lowered.as_str(), SortDirection::Asc),
    };
    Some(SortSpec {
        key: S::parse_sort_key(key)?,
        direction,
    })
}

fn cmp_text(left: &str, right: &str) -> Ordering {
    left.to_lowercase().cmp(&right.to_lowercase())
}

fn cmp_name(left: (&str, &str), right: (&str, &str)) -> Ordering {
    cmp_text(left.1, right.1).then_with(|| cmp_text(left.0, right.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmployeeSortKey {
    Id,
    Name,
    HireDate,
}

impl EmployeeSortKey {
    pub const ALL: [Self; 3] = [Self::Id, Self::Name, Self::HireDate];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::HireDate => "hire_date",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmployeesScreen;

impl Screen for EmployeesScreen {
    const KIND: ScreenKind = ScreenKind::Employees;

    type Record = Employee;
    type Category = EmploymentStatus;
    type SortKey = EmployeeSortKey;

    fn default_sort() -> SortSpec<Self::SortKey> {
        SortSpec::asc(EmployeeSortKey::Id)
    }

    fn matches(category: Self::Category, record: &Employee) -> bool {
        record.status == category
    }

    fn compare(key: Self::SortKey, left: &Employee, right: &Employee) -> Ordering {
        match key {
            EmployeeSortKey::Id => left.id.cmp(&right.id),
            EmployeeSortKey::Name => cmp_name(
                (&left.first_name, &left.last_name),
                (&right.first_name, &right.last_name),
            ),
            EmployeeSortKey::HireDate => left.hire_date.cmp(&right.hire_date),
        }
    }

    fn search_fields(record: &Employee) -> Vec<String> {
        vec![
            record.id.to_string(),
            record.full_name(),
            record.position.clone(),
            record.status.label().to_owned(),
            format_date(record.hire_date),
        ]
    }

    fn parse_category(value: &str) -> Option<Self::Category> {
        EmploymentStatus::parse(value)
    }

    fn parse_sort_key(value: &str) -> Option<Self::SortKey> {
        EmployeeSortKey::parse(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberSortKey {
    Id,
    Name,
    JoinedOn,
    ExpiresOn,
}

impl MemberSortKey {
    pub const ALL: [Self; 4] = [Self::Id, Self::Name, Self::JoinedOn, Self::ExpiresOn];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::JoinedOn => "joined_on",
            Self::ExpiresOn => "expires_on",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MembersScreen;

impl Screen for MembersScreen {
    const KIND: ScreenKind = ScreenKind::Members;

    type Record = Member;
    type Category = MembershipStatus;
    type SortKey = MemberSortKey;

    fn default_sort() -> SortSpec<Self::SortKey> {
        SortSpec::asc(MemberSortKey::Id)
    }

    fn matches(category: Self::Category, record: &Member) -> bool {
        record.status == category
    }

    fn compare(key: Self::SortKey, left: &Member, right: &Member) -> Ordering {
        match key {
            MemberSortKey::Id => left.id.cmp(&right.id),
            MemberSortKey::Name => cmp_name(
                (&left.first_name, &left.last_name),
                (&right.first_name, &right.last_name),
            ),
            MemberSortKey::JoinedOn => left.joined_on.cmp(&right.joined_on),
            MemberSortKey::ExpiresOn => left.expires_on.cmp(&right.expires_on),
        }
    }

    fn search_fields(record: &Member) -> Vec<String> {
        vec![
            record.id.to_string(),
            record.full_name(),
            record.email.clone(),
            record.phone.clone(),
            record.plan.label().to_owned(),
            record.status.label().to_owned(),
        ]
    }

    fn parse_category(value: &str) -> Option<Self::Category> {
        MembershipStatus::parse(value)
    }

    fn parse_sort_key(value: &str) -> Option<Self::SortKey> {
        MemberSortKey::parse(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquipmentSortKey {
    Id,
    Name,
    PurchaseDate,
}

impl EquipmentSortKey {
    pub const ALL: [Self; 3] = [Self::Id, Self::Name, Self::PurchaseDate];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::PurchaseDate => "purchase_date",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EquipmentScreen;

impl Screen for EquipmentScreen {
    const KIND: ScreenKind = ScreenKind::Equipment;

    type Record = Equipment;
    type Category = EquipmentCategory;
    type SortKey = EquipmentSortKey;

    fn default_sort() -> SortSpec<Self::SortKey> {
        SortSpec::asc(EquipmentSortKey::Id)
    }

    fn matches(category: Self::Category, record: &Equipment) -> bool {
        record.category == category
    }

    fn compare(key: Self::SortKey, left: &Equipment, right: &Equipment) -> Ordering {
        match key {
            EquipmentSortKey::Id => left.id.cmp(&right.id),
            EquipmentSortKey::Name => cmp_text(&left.name, &right.name),
            EquipmentSortKey::PurchaseDate => left.purchase_date.cmp(&right.purchase_date),
        }
    }

    fn search_fields(record: &Equipment) -> Vec<String> {
        vec![
            record.id.to_string(),
            record.name.clone(),
            record.category.label().to_owned(),
            record.condition.label().to_owned(),
            record.location.clone(),
            format_date(record.purchase_date),
        ]
    }

    fn parse_category(value: &str) -> Option<Self::Category> {
        EquipmentCategory::parse(value)
    }

    fn parse_sort_key(value: &str) -> Option<Self::SortKey> {
        EquipmentSortKey::parse(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductSortKey {
    Id,
    Name,
    Price,
    Stock,
}

impl ProductSortKey {
    pub const ALL: [Self; 4] = [Self::Id, Self::Name, Self::Price, Self::Stock];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Price => "price",
            Self::Stock => "stock",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProductsScreen;

impl Screen for ProductsScreen {
    const KIND: ScreenKind = ScreenKind::Products;

    type Record = Product;
    type Category = ProductCategory;
    type SortKey = ProductSortKey;

    fn default_sort() -> SortSpec<Self::SortKey> {
        SortSpec::asc(ProductSortKey::Id)
    }

    fn matches(category: Self::Category, record: &Product) -> bool {
        record.category == category
    }

    fn compare(key: Self::SortKey, left: &Product, right: &Product) -> Ordering {
        match key {
            ProductSortKey::Id => left.id.cmp(&right.id),
            ProductSortKey::Name => cmp_text(&left.name, &right.name),
            ProductSortKey::Price => left.price_cents.cmp(&right.price_cents),
            ProductSortKey::Stock => left.stock.cmp(&right.stock),
        }
    }

    fn search_fields(record: &Product) -> Vec<String> {
        vec![
            record.id.to_string(),
            record.name.clone(),
            record.category.label().to_owned(),
            format_money(record.price_cents),
        ]
    }

    fn parse_category(value: &str) -> Option<Self::Category> {
        ProductCategory::parse(value)
    }

    fn parse_sort_key(value: &str) -> Option<Self::SortKey> {
        ProductSortKey::parse(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupplierSortKey {
    Id,
    Name,
    AddedOn,
}

impl SupplierSortKey {
    pub const ALL: [Self; 3] = [Self::Id, Self::Name, Self::AddedOn];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::AddedOn => "added_on",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SuppliersScreen;

impl Screen for SuppliersScreen {
    const KIND: ScreenKind = ScreenKind::Suppliers;

    type Record = Supplier;
    type Category = SupplierStatus;
    type SortKey = SupplierSortKey;

    fn default_sort() -> SortSpec<Self::SortKey> {
        SortSpec::asc(SupplierSortKey::Id)
    }

    fn matches(category: Self::Category, record: &Supplier) -> bool {
        record.status == category
    }

    fn compare(key: Self::SortKey, left: &Supplier, right: &Supplier) -> Ordering {
        match key {
            SupplierSortKey::Id => left.id.cmp(&right.id),
            SupplierSortKey::Name => cmp_text(&left.name, &right.name),
            SupplierSortKey::AddedOn => left.added_on.cmp(&right.added_on),
        }
    }

    fn search_fields(record: &Supplier) -> Vec<String> {
        vec![
            record.id.to_string(),
            record.name.clone(),
            record.contact_name.clone(),
            record.email.clone(),
            record.phone.clone(),
            record.status.label().to_owned(),
        ]
    }

    fn parse_category(value: &str) -> Option<Self::Category> {
        SupplierStatus::parse(value)
    }

    fn parse_sort_key(value: &str) -> Option<Self::SortKey> {
        SupplierSortKey::parse(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditSortKey {
    Id,
    OccurredAt,
    Actor,
}

impl AuditSortKey {
    pub const ALL: [Self; 3] = [Self::Id, Self::OccurredAt, Self::Actor];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::OccurredAt => "occurred_at",
            Self::Actor => "actor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuditLogScreen;

impl Screen for AuditLogScreen {
    const KIND: ScreenKind = ScreenKind::AuditLog;

    type Record = AuditEntry;
    type Category = AuditAction;
    type SortKey = AuditSortKey;

    // Newest first.
    fn default_sort() -> SortSpec<Self::SortKey> {
        SortSpec::desc(AuditSortKey::OccurredAt)
    }

    fn matches(category: Self::Category, record: &AuditEntry) -> bool {
        record.action == category
    }

    fn compare(key: Self::SortKey, left: &AuditEntry, right: &AuditEntry) -> Ordering {
        match key {
            AuditSortKey::Id => left.id.cmp(&right.id),
            AuditSortKey::OccurredAt => left.occurred_at.cmp(&right.occurred_at),
            AuditSortKey::Actor => cmp_text(&left.actor, &right.actor),
        }
    }

    fn search_fields(record: &AuditEntry) -> Vec<String> {
        vec![
            record.id.to_string(),
            record.actor.clone(),
            record.action.label().to_owned(),
            record.entity.clone(),
            record.details.clone(),
            format_timestamp(record.occurred_at),
        ]
    }

    fn parse_category(value: &str) -> Option<Self::Category> {
        AuditAction::parse(value)
    }

    fn parse_sort_key(value: &str) -> Option<Self::SortKey> {
        AuditSortKey::parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AuditLogScreen, AuditSortKey, CategoryFilter, EmployeeSortKey, EmployeesScreen,
        EquipmentScreen, EquipmentSortKey, Keyword, ProductSortKey, ProductsScreen, Screen,
        SortSpec, parse_category_filter, parse_sort_spec,
    };
    use gymdesk_app::{
        Employee, EmployeeId, EmploymentStatus, EquipmentCategory, ProductCategory, SortDirection,
    };
    use std::cmp::Ordering;
    use time::macros::date;

    fn employee(id: i64, first: &str, last: &str) -> Employee {
        Employee {
            id: EmployeeId::new(id),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            position: "Trainer".to_owned(),
            email: String::new(),
            phone: String::new(),
            status: EmploymentStatus::Active,
            hire_date: date!(2024 - 03 - 01),
        }
    }

    #[test]
    fn all_filter_admits_everything() {
        let mut record = employee(1, "Avery", "Walker");
        record.status = EmploymentStatus::Terminated;
        assert!(EmployeesScreen::admits(CategoryFilter::All, &record));
        assert!(!EmployeesScreen::admits(
            CategoryFilter::Only(EmploymentStatus::Active),
            &record
        ));
    }

    #[test]
    fn name_sort_is_case_insensitive_last_then_first() {
        let left = employee(1, "avery", "walker");
        let right = employee(2, "Jordan", "Walker");
        assert_eq!(
            EmployeesScreen::compare(EmployeeSortKey::Name, &left, &right),
            Ordering::Less
        );
        assert_eq!(
            EmployeesScreen::ordering(SortSpec::desc(EmployeeSortKey::Name), &left, &right),
            Ordering::Greater
        );
    }

    #[test]
    fn search_fields_include_formatted_date_and_status() {
        let fields = EmployeesScreen::search_fields(&employee(4, "Kai", "Reed"));
        assert!(fields.contains(&"4".to_owned()));
        assert!(fields.contains(&"Kai Reed".to_owned()));
        assert!(fields.contains(&"Active".to_owned()));
        assert!(fields.contains(&"2024-03-01".to_owned()));
    }

    #[test]
    fn category_filter_parsing_accepts_sentinel_and_rejects_unknown() {
        assert_eq!(
            parse_category_filter::<ProductsScreen>("ALL"),
            Some(CategoryFilter::All)
        );
        assert_eq!(
            parse_category_filter::<ProductsScreen>("apparel"),
            Some(CategoryFilter::Only(ProductCategory::Apparel))
        );
        assert_eq!(parse_category_filter::<ProductsScreen>("weights"), None);
    }

    #[test]
    fn sort_spec_parsing_handles_direction_suffix() {
        assert_eq!(
            parse_sort_spec::<ProductsScreen>("price:desc"),
            Some(SortSpec::desc(ProductSortKey::Price))
        );
        assert_eq!(
            parse_sort_spec::<ProductsScreen>("stock"),
            Some(SortSpec {
                key: ProductSortKey::Stock,
                direction: SortDirection::Asc,
            })
        );
        assert_eq!(parse_sort_spec::<ProductsScreen>("price:sideways"), None);
        assert_eq!(parse_sort_spec::<ProductsScreen>("weight"), None);
    }

    #[test]
    fn audit_log_defaults_to_newest_first() {
        assert_eq!(
            AuditLogScreen::default_sort(),
            SortSpec::desc(AuditSortKey::OccurredAt)
        );
    }

    #[test]
    fn keywords_parse_back_to_the_same_value() {
        for category in EquipmentCategory::ALL {
            assert_eq!(
                parse_category_filter::<EquipmentScreen>(category.keyword()),
                Some(CategoryFilter::Only(category))
            );
        }
        for key in EquipmentSortKey::ALL {
            assert_eq!(
                parse_sort_spec::<EquipmentScreen>(key.keyword()),
                Some(SortSpec {
                    key,
                    direction: SortDirection::Asc,
                })
            );
        }
        assert_eq!(EquipmentCategory::FreeWeights.keyword(), "free_weights");
    }
}
