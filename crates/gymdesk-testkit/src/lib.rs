// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use gymdesk_app::{
    AuditAction, AuditEntry, AuditEntryId, Employee, EmployeeId, EmploymentStatus, Equipment,
    EquipmentCategory, EquipmentCondition, EquipmentId, Member, MemberId, MembershipPlan,
    MembershipStatus, Product, ProductCategory, ProductId, Supplier, SupplierId, SupplierStatus,
};
use time::macros::datetime;
use time::{Date, Duration, OffsetDateTime};

const REFERENCE_NOW: OffsetDateTime = datetime!(2026-01-01 0:00 UTC);

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Brooks", "Price", "Bennett", "Foster", "Hayes", "Doe", "Sims", "Perry",
];

const POSITIONS: [&str; 7] = [
    "Personal Trainer",
    "Front Desk",
    "Group Instructor",
    "Manager",
    "Nutritionist",
    "Maintenance",
    "Sales",
];

const LOCATIONS: [&str; 6] = [
    "Main Floor",
    "Cardio Deck",
    "Studio A",
    "Studio B",
    "Weight Room",
    "Storage",
];

const SUPPLIER_WORDS: [&str; 10] = [
    "Iron", "Peak", "Summit", "Vital", "Core", "Titan", "Pulse", "Apex", "Forge", "Motion",
];
const SUPPLIER_SUFFIXES: [&str; 5] = ["Supply", "Fitness", "Nutrition", "Co", "Wholesale"];

const DETAIL_WORDS: [&str; 12] = [
    "updated", "record", "changed", "status", "renewed", "plan", "price", "stock", "contact",
    "fixed", "typo", "entry",
];

fn equipment_names(category: EquipmentCategory) -> &'static [&'static str] {
    match category {
        EquipmentCategory::Cardio => &["Treadmill", "Rowing Machine", "Elliptical", "Spin Bike"],
        EquipmentCategory::Strength => {
            &["Leg Press", "Cable Tower", "Smith Machine", "Lat Pulldown"]
        }
        EquipmentCategory::FreeWeights => {
            &["Dumbbell Set", "Barbell", "Kettlebell Rack", "EZ Bar"]
        }
        EquipmentCategory::Accessories => {
            &["Yoga Mats", "Foam Rollers", "Resistance Bands", "Jump Ropes"]
        }
    }
}

fn product_names(category: ProductCategory) -> &'static [&'static str] {
    match category {
        ProductCategory::Supplements => &["Whey Protein", "Creatine", "Pre-Workout", "BCAA Mix"],
        ProductCategory::Beverages => {
            &["Energy Drink", "Sparkling Water", "Electrolyte Mix", "Cold Brew"]
        }
        ProductCategory::Apparel => &["Logo Tee", "Training Shorts", "Hoodie", "Grip Socks"],
        ProductCategory::Accessories => &["Shaker Bottle", "Lifting Straps", "Towel", "Padlock"],
    }
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for gym records. The same seed always yields the same
/// sequence; ids count up from 1 per record kind.
#[derive(Debug, Clone)]
pub struct GymFaker {
    rng: DeterministicRng,
    seed: u64,
    next_ids: [i64; 6],
}

impl GymFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
            next_ids: [1; 6],
        }
    }

    pub const fn seed(&self) -> u64 {
        self.seed
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn employee(&mut self) -> Employee {
        let first_name = self.pick(&FIRST_NAMES).to_owned();
        let last_name = self.pick(&LAST_NAMES).to_owned();
        let status = self.weighted(&[
            (EmploymentStatus::Active, 6),
            (EmploymentStatus::Inactive, 2),
            (EmploymentStatus::Terminated, 1),
        ]);
        Employee {
            id: EmployeeId::new(self.next_id(0)),
            email: email_for(&first_name, &last_name, "gymdesk.test"),
            phone: self.phone(),
            position: self.pick(&POSITIONS).to_owned(),
            status,
            hire_date: self.date_within_days(365 * 6),
            first_name,
            last_name,
        }
    }

    pub fn member(&mut self) -> Member {
        let first_name = self.pick(&FIRST_NAMES).to_owned();
        let last_name = self.pick(&LAST_NAMES).to_owned();
        let plan = self.pick_from(&MembershipPlan::ALL);
        let joined_on = self.date_within_days(365 * 3);
        let expires_on = joined_on + Duration::days(plan.months() * 30);
        let status = if expires_on < REFERENCE_NOW.date() {
            MembershipStatus::Expired
        } else if self.int_n(10) == 0 {
            MembershipStatus::Suspended
        } else {
            MembershipStatus::Active
        };
        Member {
            id: MemberId::new(self.next_id(1)),
            email: email_for(&first_name, &last_name, "example.com"),
            phone: self.phone(),
            plan,
            status,
            joined_on,
            expires_on,
            first_name,
            last_name,
        }
    }

    pub fn equipment(&mut self) -> Equipment {
        let category = self.pick_from(&EquipmentCategory::ALL);
        let condition = self.weighted(&[
            (EquipmentCondition::Good, 7),
            (EquipmentCondition::NeedsRepair, 2),
            (EquipmentCondition::OutOfService, 1),
        ]);
        Equipment {
            id: EquipmentId::new(self.next_id(2)),
            name: self.pick(equipment_names(category)).to_owned(),
            category,
            condition,
            location: self.pick(&LOCATIONS).to_owned(),
            purchase_date: self.date_within_days(365 * 8),
        }
    }

    /// A product whose supplier, if any, has an id in `1..=supplier_count`.
    pub fn product(&mut self, supplier_count: usize) -> Product {
        let category = self.pick_from(&ProductCategory::ALL);
        let supplier_id = if supplier_count == 0 || self.int_n(6) == 0 {
            None
        } else {
            Some(SupplierId::new(self.int_n(supplier_count) as i64 + 1))
        };
        Product {
            id: ProductId::new(self.next_id(3)),
            name: self.pick(product_names(category)).to_owned(),
            category,
            price_cents: self.int_range(3, 80) * 100 + 99,
            stock: self.int_range(0, 120) as i32,
            supplier_id,
        }
    }

    pub fn supplier(&mut self) -> Supplier {
        let name = format!(
            "{} {}",
            self.pick(&SUPPLIER_WORDS),
            self.pick(&SUPPLIER_SUFFIXES)
        );
        let contact_first = self.pick(&FIRST_NAMES);
        let contact_last = self.pick(&LAST_NAMES);
        let domain = format!("{}.test", name.replace(' ', "").to_lowercase());
        Supplier {
            id: SupplierId::new(self.next_id(4)),
            email: email_for(contact_first, contact_last, &domain),
            contact_name: format!("{contact_first} {contact_last}"),
            phone: self.phone(),
            status: self.weighted(&[(SupplierStatus::Active, 4), (SupplierStatus::Inactive, 1)]),
            added_on: self.date_within_days(365 * 5),
            name,
        }
    }

    pub fn audit_entry(&mut self) -> AuditEntry {
        let actor = format!(
            "{}.{}",
            self.pick(&FIRST_NAMES).to_lowercase(),
            self.pick(&LAST_NAMES).to_lowercase()
        );
        let action = self.pick_from(&AuditAction::ALL);
        let entity = match action {
            AuditAction::Login | AuditAction::Logout => "session".to_owned(),
            _ => {
                let kind = self.pick(&["member", "employee", "product", "equipment", "supplier"]);
                format!("{kind} #{}", self.int_range(1, 200))
            }
        };
        AuditEntry {
            id: AuditEntryId::new(self.next_id(5)),
            actor,
            action,
            entity,
            details: self.sentence(2, 5),
            occurred_at: self.datetime_within_days(90),
        }
    }

    pub fn employees(&mut self, count: usize) -> Vec<Employee> {
        (0..count).map(|_| self.employee()).collect()
    }

    pub fn members(&mut self, count: usize) -> Vec<Member> {
        (0..count).map(|_| self.member()).collect()
    }

    pub fn equipment_list(&mut self, count: usize) -> Vec<Equipment> {
        (0..count).map(|_| self.equipment()).collect()
    }

    pub fn products(&mut self, count: usize, supplier_count: usize) -> Vec<Product> {
        (0..count).map(|_| self.product(supplier_count)).collect()
    }

    pub fn suppliers(&mut self, count: usize) -> Vec<Supplier> {
        (0..count).map(|_| self.supplier()).collect()
    }

    pub fn audit_entries(&mut self, count: usize) -> Vec<AuditEntry> {
        (0..count).map(|_| self.audit_entry()).collect()
    }

    fn next_id(&mut self, slot: usize) -> i64 {
        let id = self.next_ids[slot];
        self.next_ids[slot] += 1;
        id
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn pick_from<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.rng.int_n(items.len())]
    }

    fn weighted<T: Copy>(&mut self, choices: &[(T, usize)]) -> T {
        let total: usize = choices.iter().map(|(_, weight)| weight).sum();
        let mut roll = self.rng.int_n(total);
        for (value, weight) in choices {
            if roll < *weight {
                return *value;
            }
            roll -= weight;
        }
        choices[0].0
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }

    fn date_within_days(&mut self, days: i64) -> Date {
        REFERENCE_NOW.date() - Duration::days(self.int_range(0, days))
    }

    fn datetime_within_days(&mut self, days: i64) -> OffsetDateTime {
        let seconds = self.int_range(0, days * 24 * 60 * 60);
        REFERENCE_NOW - Duration::seconds(seconds)
    }

    fn phone(&mut self) -> String {
        format!(
            "555-{:03}-{:04}",
            self.int_range(100, 999),
            self.int_range(0, 9999)
        )
    }

    fn sentence(&mut self, min_words: usize, max_words: usize) -> String {
        let count = min_words + self.rng.int_n(max_words.saturating_sub(min_words) + 1);
        let words: Vec<&str> = (0..count).map(|_| self.pick(&DETAIL_WORDS)).collect();
        let mut sentence = words.join(" ");
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence
    }
}

/// Every screen's records, generated together so cross references line up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoData {
    pub employees: Vec<Employee>,
    pub members: Vec<Member>,
    pub equipment: Vec<Equipment>,
    pub products: Vec<Product>,
    pub suppliers: Vec<Supplier>,
    pub audit_log: Vec<AuditEntry>,
}

/// `rows` records per screen (suppliers get a third of that, at least one).
pub fn demo_data(seed: u64, rows: usize) -> DemoData {
    let mut faker = GymFaker::new(seed);
    let supplier_count = (rows / 3).max(1);
    let suppliers = faker.suppliers(supplier_count);
    DemoData {
        employees: faker.employees(rows),
        members: faker.members(rows),
        equipment: faker.equipment_list(rows),
        products: faker.products(rows, suppliers.len()),
        audit_log: faker.audit_entries(rows),
        suppliers,
    }
}

pub const fn reference_now() -> OffsetDateTime {
    REFERENCE_NOW
}

fn email_for(first: &str, last: &str, domain: &str) -> String {
    format!("{}.{}@{domain}", first.to_lowercase(), last.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::{GymFaker, demo_data, reference_now};
    use gymdesk_app::{MembershipStatus, SupplierId};
    use std::collections::BTreeSet;

    #[test]
    fn new_deterministic_seed() {
        let mut left = GymFaker::new(42);
        let mut right = GymFaker::new(42);
        assert_eq!(left.employee(), right.employee());
        assert_eq!(left.member(), right.member());
    }

    #[test]
    fn zero_seed_is_normalized() {
        assert_eq!(GymFaker::new(0).seed(), 1);
    }

    #[test]
    fn ids_count_up_per_kind() {
        let mut faker = GymFaker::new(7);
        let employees = faker.employees(3);
        let first_member = faker.member();
        let ids: Vec<i64> = employees.iter().map(|employee| employee.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(first_member.id.get(), 1);
    }

    #[test]
    fn member_expiry_follows_plan_and_status() {
        let mut faker = GymFaker::new(3);
        for member in faker.members(50) {
            assert!(member.expires_on > member.joined_on);
            if member.expires_on < reference_now().date() {
                assert_eq!(member.status, MembershipStatus::Expired);
            }
        }
    }

    #[test]
    fn products_reference_existing_suppliers() {
        let data = demo_data(11, 30);
        let known: BTreeSet<SupplierId> = data.suppliers.iter().map(|s| s.id).collect();
        for product in &data.products {
            if let Some(supplier) = product.supplier_id {
                assert!(known.contains(&supplier), "{supplier:?}");
            }
            assert!(product.price_cents > 0);
            assert!(product.stock >= 0);
        }
    }

    #[test]
    fn demo_data_sizes() {
        let data = demo_data(5, 12);
        assert_eq!(data.employees.len(), 12);
        assert_eq!(data.members.len(), 12);
        assert_eq!(data.equipment.len(), 12);
        assert_eq!(data.products.len(), 12);
        assert_eq!(data.suppliers.len(), 4);
        assert_eq!(data.audit_log.len(), 12);
        assert_eq!(demo_data(5, 12), data);
    }

    #[test]
    fn variety_across_seeds() {
        let mut names = BTreeSet::new();
        for seed in 0_u64..20_u64 {
            let mut faker = GymFaker::new(seed);
            names.insert(faker.supplier().name);
        }
        assert!(names.len() >= 8, "got {}", names.len());
    }

    #[test]
    fn audit_timestamps_are_in_the_recent_past() {
        let mut faker = GymFaker::new(9);
        for entry in faker.audit_entries(20) {
            assert!(entry.occurred_at <= reference_now());
            assert!(!entry.details.is_empty());
        }
    }

    #[test]
    fn int_n() {
        let mut faker = GymFaker::new(42);
        for _ in 0..100 {
            assert!(faker.int_n(5) < 5);
        }
    }
}
