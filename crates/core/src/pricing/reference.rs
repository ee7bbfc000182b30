//! Hand-curated market reference prices, used when fewer than the minimum
//! number of comparable listings exist for a category.
//!
//! All amounts are integer cents. Lookup resolution for a given
//! (category, account type, unit):
//! 1. exact entry in the category table;
//! 2. unit-conversion heuristic within the same table, applied only when the
//!    requested unit has no entry: day from hour ×8, week from day ×7,
//!    month from week ×4 — conversions are never chained;
//! 3. exact entry in the generic catch-all table;
//! 4. none.
//!
//! Unknown categories resolve against the generic table directly (steps 1-2
//! on the generic entries).

use serde::{Deserialize, Serialize};

use crate::domain::service::{CategorySlug, PriceUnit};
use crate::domain::user::AccountType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub min: i64,
    pub max: i64,
    pub avg: i64,
}

impl ReferenceRange {
    const fn new(min: i64, max: i64, avg: i64) -> Self {
        Self { min, max, avg }
    }

    fn scaled(&self, factor: i64) -> Self {
        Self { min: self.min * factor, max: self.max * factor, avg: self.avg * factor }
    }
}

type UnitEntry = (PriceUnit, ReferenceRange);

struct CategoryReference {
    slug: &'static str,
    particulier: &'static [UnitEntry],
    pro: &'static [UnitEntry],
}

use PriceUnit::{Day, Flat, HalfDay, Hour, Month, Week};

static CATEGORY_TABLES: &[CategoryReference] = &[
    CategoryReference {
        slug: "garde",
        particulier: &[(Hour, ReferenceRange::new(800, 1500, 1200))],
        pro: &[(Hour, ReferenceRange::new(1000, 2000, 1500))],
    },
    CategoryReference {
        slug: "promenade",
        particulier: &[
            (Hour, ReferenceRange::new(1000, 1800, 1400)),
            (HalfDay, ReferenceRange::new(3000, 5500, 4200)),
        ],
        pro: &[
            (Hour, ReferenceRange::new(1200, 2200, 1700)),
            (HalfDay, ReferenceRange::new(3800, 6500, 5000)),
        ],
    },
    CategoryReference {
        slug: "visite",
        particulier: &[
            (Hour, ReferenceRange::new(800, 1400, 1000)),
            (HalfDay, ReferenceRange::new(2500, 4500, 3500)),
        ],
        pro: &[
            (Hour, ReferenceRange::new(1000, 1800, 1400)),
            (HalfDay, ReferenceRange::new(3000, 5500, 4200)),
        ],
    },
    CategoryReference {
        slug: "pension",
        particulier: &[
            (Day, ReferenceRange::new(1500, 3000, 2200)),
            (Week, ReferenceRange::new(9000, 18000, 13000)),
        ],
        pro: &[
            (Day, ReferenceRange::new(2000, 4000, 3000)),
            (Week, ReferenceRange::new(12000, 25000, 18000)),
        ],
    },
    CategoryReference {
        slug: "toilettage",
        particulier: &[(Flat, ReferenceRange::new(2500, 5000, 3500))],
        pro: &[(Flat, ReferenceRange::new(3500, 8000, 5500))],
    },
    CategoryReference {
        slug: "dressage",
        particulier: &[(Hour, ReferenceRange::new(2000, 4000, 3000))],
        pro: &[(Hour, ReferenceRange::new(3000, 6000, 4500))],
    },
    CategoryReference {
        slug: "transport",
        particulier: &[(Flat, ReferenceRange::new(1000, 3000, 2000))],
        pro: &[(Flat, ReferenceRange::new(1500, 4500, 2800))],
    },
    CategoryReference {
        slug: "soins",
        particulier: &[(Hour, ReferenceRange::new(900, 1600, 1200))],
        pro: &[(Hour, ReferenceRange::new(1200, 2200, 1700))],
    },
    CategoryReference {
        slug: "gardedenuit",
        particulier: &[(Flat, ReferenceRange::new(2500, 5000, 3500))],
        pro: &[(Flat, ReferenceRange::new(3500, 7000, 5000))],
    },
    CategoryReference {
        slug: "chatsitting",
        particulier: &[
            (Hour, ReferenceRange::new(700, 1300, 1000)),
            (Day, ReferenceRange::new(1800, 3500, 2500)),
        ],
        pro: &[(Hour, ReferenceRange::new(900, 1700, 1300))],
    },
];

static GENERIC_PARTICULIER: &[UnitEntry] = &[
    (Hour, ReferenceRange::new(900, 1800, 1300)),
    (Day, ReferenceRange::new(1800, 3600, 2600)),
    (Week, ReferenceRange::new(10000, 20000, 14500)),
    (Month, ReferenceRange::new(32000, 68000, 48000)),
    (Flat, ReferenceRange::new(1500, 3500, 2400)),
];

static GENERIC_PRO: &[UnitEntry] = &[
    (Hour, ReferenceRange::new(1200, 2400, 1800)),
    (Day, ReferenceRange::new(2400, 4800, 3400)),
    (Week, ReferenceRange::new(14000, 26000, 19000)),
    (Month, ReferenceRange::new(45000, 90000, 65000)),
    (Flat, ReferenceRange::new(2000, 5000, 3200)),
];

fn generic_entries(account: AccountType) -> &'static [UnitEntry] {
    match account {
        AccountType::Particulier => GENERIC_PARTICULIER,
        AccountType::Pro => GENERIC_PRO,
    }
}

fn category_entries(slug: &str, account: AccountType) -> Option<&'static [UnitEntry]> {
    CATEGORY_TABLES.iter().find(|table| table.slug == slug).map(|table| match account {
        AccountType::Particulier => table.particulier,
        AccountType::Pro => table.pro,
    })
}

fn exact(entries: &[UnitEntry], unit: PriceUnit) -> Option<ReferenceRange> {
    entries.iter().find(|(entry_unit, _)| *entry_unit == unit).map(|(_, range)| *range)
}

fn converted(entries: &[UnitEntry], unit: PriceUnit) -> Option<ReferenceRange> {
    let (source, factor) = match unit {
        Day => (Hour, 8),
        Week => (Day, 7),
        Month => (Week, 4),
        _ => return None,
    };
    exact(entries, source).map(|range| range.scaled(factor))
}

fn resolve(entries: &[UnitEntry], unit: PriceUnit) -> Option<ReferenceRange> {
    exact(entries, unit).or_else(|| converted(entries, unit))
}

/// Reference price range for (category, account type, unit), or `None` when
/// neither the category table nor the generic table covers the unit.
pub fn lookup(
    category: &CategorySlug,
    account: AccountType,
    unit: PriceUnit,
) -> Option<ReferenceRange> {
    match category_entries(category.as_str(), account) {
        Some(entries) => {
            resolve(entries, unit).or_else(|| exact(generic_entries(account), unit))
        }
        None => resolve(generic_entries(account), unit),
    }
}

#[cfg(test)]
mod tests {
    use super::{lookup, ReferenceRange};
    use crate::domain::service::{CategorySlug, PriceUnit};
    use crate::domain::user::AccountType;

    fn slug(raw: &str) -> CategorySlug {
        CategorySlug::new(raw)
    }

    #[test]
    fn exact_entry_wins() {
        let range = lookup(&slug("garde"), AccountType::Particulier, PriceUnit::Hour)
            .expect("garde hour entry");
        assert_eq!(range, ReferenceRange { min: 800, max: 1500, avg: 1200 });
    }

    #[test]
    fn pro_tier_reads_its_own_half_of_the_table() {
        let range =
            lookup(&slug("garde"), AccountType::Pro, PriceUnit::Hour).expect("garde pro hour");
        assert_eq!(range, ReferenceRange { min: 1000, max: 2000, avg: 1500 });
    }

    #[test]
    fn day_converts_from_hour_times_eight() {
        let range = lookup(&slug("garde"), AccountType::Particulier, PriceUnit::Day)
            .expect("converted day range");
        assert_eq!(range, ReferenceRange { min: 6400, max: 12000, avg: 9600 });
    }

    #[test]
    fn month_is_not_chained_through_hour_and_falls_to_generic() {
        // garde only defines hour; month <- week <- day conversions do not
        // chain, so the generic table's month entry applies.
        let range = lookup(&slug("garde"), AccountType::Particulier, PriceUnit::Month)
            .expect("generic month range");
        assert_eq!(range, ReferenceRange { min: 32000, max: 68000, avg: 48000 });
    }

    #[test]
    fn week_converts_from_day_times_seven() {
        let range = lookup(&slug("chatsitting"), AccountType::Particulier, PriceUnit::Week)
            .expect("converted week range");
        assert_eq!(range, ReferenceRange { min: 12600, max: 24500, avg: 17500 });
    }

    #[test]
    fn month_converts_from_week_times_four() {
        let range = lookup(&slug("pension"), AccountType::Particulier, PriceUnit::Month)
            .expect("converted month range");
        assert_eq!(range, ReferenceRange { min: 36000, max: 72000, avg: 52000 });
    }

    #[test]
    fn unknown_category_resolves_against_generic_table() {
        let range = lookup(&slug("fauconnerie"), AccountType::Particulier, PriceUnit::Hour)
            .expect("generic hour range");
        assert_eq!(range, ReferenceRange { min: 900, max: 1800, avg: 1300 });
    }

    #[test]
    fn unknown_category_also_uses_conversions_on_generic_shape() {
        // Generic has a day entry, so this is the exact entry, not hour x8.
        let range = lookup(&slug("fauconnerie"), AccountType::Particulier, PriceUnit::Day)
            .expect("generic day range");
        assert_eq!(range, ReferenceRange { min: 1800, max: 3600, avg: 2600 });
    }

    #[test]
    fn unit_missing_everywhere_yields_none() {
        // garde has no half_day entry, half_day has no conversion source,
        // and the generic table does not cover half_day either.
        assert_eq!(lookup(&slug("garde"), AccountType::Particulier, PriceUnit::HalfDay), None);
        assert_eq!(lookup(&slug("inconnu"), AccountType::Pro, PriceUnit::HalfDay), None);
    }

    #[test]
    fn normalized_slug_input_matches_category_tables() {
        let range = lookup(&slug("Garde de nuit"), AccountType::Particulier, PriceUnit::Flat)
            .expect("gardedenuit flat");
        assert_eq!(range, ReferenceRange { min: 2500, max: 5000, avg: 3500 });
    }
}
