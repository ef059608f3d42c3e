use crate::models::{
    Booth, BoothRevenueRow, DashboardResponse, FrequencyRow, Service, ServiceUsageRow,
    TransactionRecord,
};
use crate::money::Money;
use std::collections::BTreeMap;

/// Flat 5% on every transaction, not configurable per service.
pub const TAX_RATE_PERCENT: i64 = 5;

/// Threshold the tax progress bar is measured against.
pub const TAX_THRESHOLD: Money = Money::from_kwacha(1000);

pub fn tax_for(amount: Money) -> Money {
    amount.percent(TAX_RATE_PERCENT)
}

/// Progress-bar percentage for a tax amount, one use of which is the
/// `tax_percent` field of the transaction response. Clamped to 100.
pub fn tax_percent(tax: Money) -> f64 {
    let percent = (tax.ngwee() * 100) as f64 / TAX_THRESHOLD.ngwee() as f64;
    percent.min(100.0)
}

/// Why a submission was refused. No state changes on any of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    InvalidAmount,
    ServiceNotOffered { booth: Booth, service: Service },
    CapExceeded { service: Service, cap: Money, used: Money, remaining: Money },
}

impl Rejection {
    pub fn message(&self) -> String {
        match self {
            Rejection::InvalidAmount => {
                "Amount must be a positive number".to_string()
            }
            Rejection::ServiceNotOffered { booth, service } => {
                format!("{service} is not offered at {booth}")
            }
            Rejection::CapExceeded { service, cap, used, remaining } => {
                format!(
                    "Transaction rejected: {service} monthly limit is {}, already used {used}, \
                     remaining {remaining}. Maximum allowed: {remaining}",
                    cap.grouped()
                )
            }
        }
    }
}

/// Derived totals over the transaction list. Never persisted; always
/// reproducible by replaying the list from empty, and kept equal to that
/// replay as an invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregates {
    booth_revenue: BTreeMap<Booth, Money>,
    service_totals: BTreeMap<Service, Money>,
    service_tax: BTreeMap<Service, Money>,
    frequencies: BTreeMap<(Booth, Service), u64>,
}

impl Aggregates {
    /// Full fold over a transaction list. Order independent: every record
    /// contributes one saturating add per counter.
    pub fn replay(records: &[TransactionRecord]) -> Self {
        let mut aggregates = Aggregates::default();
        for record in records {
            aggregates.apply(record);
        }
        aggregates
    }

    /// Incremental update for one committed record.
    pub fn apply(&mut self, record: &TransactionRecord) {
        let revenue = self.booth_revenue.entry(record.booth).or_default();
        *revenue = revenue.saturating_add(record.amount);
        let total = self.service_totals.entry(record.service).or_default();
        *total = total.saturating_add(record.amount);
        let tax = self.service_tax.entry(record.service).or_default();
        *tax = tax.saturating_add(record.tax);
        let count = self.frequencies.entry((record.booth, record.service)).or_default();
        *count = count.saturating_add(1);
    }

    /// Validates a submission against the per-service monthly cap. The
    /// boundary is inclusive: an amount equal to the remaining headroom
    /// passes. Amount validity is checked before the cap.
    pub fn check(&self, booth: Booth, service: Service, amount: Money) -> Result<(), Rejection> {
        if !amount.is_positive() {
            return Err(Rejection::InvalidAmount);
        }
        if !booth.offers(service) {
            return Err(Rejection::ServiceNotOffered { booth, service });
        }
        let cap = service.monthly_cap();
        let used = self.service_total(service);
        let remaining = cap - used;
        if amount > remaining {
            return Err(Rejection::CapExceeded { service, cap, used, remaining });
        }
        Ok(())
    }

    pub fn booth_revenue(&self, booth: Booth) -> Money {
        self.booth_revenue.get(&booth).copied().unwrap_or_default()
    }

    pub fn service_total(&self, service: Service) -> Money {
        self.service_totals.get(&service).copied().unwrap_or_default()
    }

    pub fn service_tax(&self, service: Service) -> Money {
        self.service_tax.get(&service).copied().unwrap_or_default()
    }

    pub fn frequency(&self, booth: Booth, service: Service) -> u64 {
        self.frequencies.get(&(booth, service)).copied().unwrap_or_default()
    }

    pub fn remaining(&self, service: Service) -> Money {
        service.monthly_cap() - self.service_total(service)
    }

    pub fn total_revenue(&self) -> Money {
        self.booth_revenue.values().copied().sum()
    }

    pub fn total_tax(&self) -> Money {
        self.service_tax.values().copied().sum()
    }

    /// The dashboard projection: three tables plus the pie-chart totals,
    /// rebuilt wholesale from the aggregates on every request.
    pub fn project(&self) -> DashboardResponse {
        let services = Service::ALL
            .iter()
            .map(|&service| ServiceUsageRow {
                service,
                limit: service.monthly_cap(),
                used: self.service_total(service),
                remaining: self.remaining(service),
                tax: self.service_tax(service),
            })
            .collect();

        let booths = Booth::ALL
            .iter()
            .map(|&booth| BoothRevenueRow {
                booth,
                location: booth.location(),
                revenue: self.booth_revenue(booth),
            })
            .collect();

        let frequencies = self
            .frequencies
            .iter()
            .map(|(&(booth, service), &count)| FrequencyRow { booth, service, count })
            .collect();

        DashboardResponse {
            services,
            booths,
            frequencies,
            total_revenue: self.total_revenue(),
            total_tax: self.total_tax(),
        }
    }
}

/// Sequential ids in the `WB0000001` style. Only a last id of exactly `WB`
/// plus seven digits continues the sequence; anything else restarts it.
pub fn next_transaction_id(records: &[TransactionRecord]) -> String {
    let next = records
        .last()
        .and_then(|record| record.id.strip_prefix("WB"))
        .filter(|digits| digits.len() == 7 && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse::<u64>().ok())
        .map(|n| n + 1)
        .unwrap_or(1);
    format!("WB{next:07}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(booth: Booth, service: Service, amount: Money) -> TransactionRecord {
        TransactionRecord {
            id: "WB0000001".to_string(),
            booth,
            service,
            amount,
            tax: tax_for(amount),
            location: booth.location().to_string(),
            timestamp: "2026-08-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn cap_boundary_is_inclusive() {
        // MTN cap is 160,000; fill it to 159,999.50.
        let mut aggregates = Aggregates::default();
        aggregates.apply(&record(
            Booth::Wina1,
            Service::MtnMoney,
            Money::from_f64(159_999.50).unwrap(),
        ));

        let exact = Money::from_f64(0.50).unwrap();
        assert_eq!(aggregates.check(Booth::Wina2, Service::MtnMoney, exact), Ok(()));

        let over = Money::from_f64(0.51).unwrap();
        match aggregates.check(Booth::Wina2, Service::MtnMoney, over) {
            Err(Rejection::CapExceeded { remaining, .. }) => {
                assert_eq!(remaining.to_string(), "K0.50");
            }
            other => panic!("expected cap rejection, got {other:?}"),
        }
    }

    #[test]
    fn remaining_hits_zero_after_exact_fill() {
        let mut aggregates = Aggregates::default();
        aggregates.apply(&record(
            Booth::Wina1,
            Service::MtnMoney,
            Money::from_f64(159_999.50).unwrap(),
        ));
        aggregates.apply(&record(
            Booth::Wina2,
            Service::MtnMoney,
            Money::from_f64(0.50).unwrap(),
        ));
        assert_eq!(aggregates.remaining(Service::MtnMoney), Money::ZERO);
        assert!(aggregates
            .check(Booth::Wina1, Service::MtnMoney, Money::from_ngwee(1))
            .is_err());
    }

    #[test]
    fn cap_is_shared_across_booths() {
        let mut aggregates = Aggregates::default();
        aggregates.apply(&record(Booth::Wina1, Service::ZamtelMoney, Money::from_kwacha(40_000)));
        aggregates.apply(&record(Booth::Wina4, Service::ZamtelMoney, Money::from_kwacha(30_000)));
        assert_eq!(aggregates.remaining(Service::ZamtelMoney), Money::ZERO);
        assert!(aggregates
            .check(Booth::Wina6, Service::ZamtelMoney, Money::from_kwacha(1))
            .is_err());
    }

    #[test]
    fn amount_validity_is_checked_before_the_cap() {
        let aggregates = Aggregates::default();
        assert_eq!(
            aggregates.check(Booth::Wina1, Service::Fnb, Money::ZERO),
            Err(Rejection::InvalidAmount)
        );
        assert_eq!(
            aggregates.check(Booth::Wina1, Service::Fnb, Money::from_ngwee(-100)),
            Err(Rejection::InvalidAmount)
        );
    }

    #[test]
    fn unoffered_pair_is_rejected() {
        let aggregates = Aggregates::default();
        assert_eq!(
            aggregates.check(Booth::Wina4, Service::Zanaco, Money::from_kwacha(10)),
            Err(Rejection::ServiceNotOffered { booth: Booth::Wina4, service: Service::Zanaco })
        );
    }

    #[test]
    fn replay_is_order_independent() {
        let records = vec![
            record(Booth::Wina1, Service::AirtelMoney, Money::from_kwacha(120)),
            record(Booth::Wina3, Service::Zanaco, Money::from_kwacha(75)),
            record(Booth::Wina1, Service::AirtelMoney, Money::from_kwacha(5)),
            record(Booth::Wina6, Service::ZamtelMoney, Money::from_f64(0.01).unwrap()),
        ];
        let forward = Aggregates::replay(&records);
        let mut reversed = records.clone();
        reversed.reverse();
        assert_eq!(forward, Aggregates::replay(&reversed));
    }

    #[test]
    fn incremental_apply_matches_full_replay() {
        let records = vec![
            record(Booth::Wina2, Service::Fnb, Money::from_kwacha(300)),
            record(Booth::Wina2, Service::MtnMoney, Money::from_kwacha(40)),
            record(Booth::Wina5, Service::Fnb, Money::from_kwacha(12)),
        ];
        let mut incremental = Aggregates::default();
        for record in &records {
            incremental.apply(record);
        }
        assert_eq!(incremental, Aggregates::replay(&records));
        assert_eq!(incremental.frequency(Booth::Wina2, Service::Fnb), 1);
        assert_eq!(incremental.booth_revenue(Booth::Wina2), Money::from_kwacha(340));
    }

    #[test]
    fn saturated_usage_still_yields_a_remaining() {
        // Amounts this large only appear in a hand-edited data file; the
        // computation must stay total rather than panic.
        let mut aggregates = Aggregates::default();
        let huge = Money::from_ngwee(i64::MAX);
        aggregates.apply(&record(Booth::Wina1, Service::MtnMoney, huge));
        aggregates.apply(&record(Booth::Wina2, Service::MtnMoney, huge));
        assert_eq!(aggregates.service_total(Service::MtnMoney), huge);
        assert!(aggregates.remaining(Service::MtnMoney) < Money::ZERO);
        assert!(aggregates
            .check(Booth::Wina1, Service::MtnMoney, Money::from_kwacha(1))
            .is_err());
    }

    #[test]
    fn tax_is_five_percent() {
        let tax = tax_for(Money::from_kwacha(1000));
        assert_eq!(tax, Money::from_kwacha(50));
        assert_eq!(tax_percent(tax), 5.0);
    }

    #[test]
    fn tax_percent_is_clamped() {
        let tax = tax_for(Money::from_kwacha(50_000));
        assert_eq!(tax_percent(tax), 100.0);
    }

    #[test]
    fn transaction_ids_are_sequential() {
        let mut records = Vec::new();
        assert_eq!(next_transaction_id(&records), "WB0000001");
        let mut first = record(Booth::Wina1, Service::Fnb, Money::from_kwacha(10));
        first.id = "WB0000009".to_string();
        records.push(first);
        assert_eq!(next_transaction_id(&records), "WB0000010");
    }

    #[test]
    fn foreign_last_id_restarts_the_sequence() {
        for id in ["TXN-123456", "WB123", "WB00000010", "WB12a4567"] {
            let mut odd = record(Booth::Wina1, Service::Fnb, Money::from_kwacha(10));
            odd.id = id.to_string();
            assert_eq!(next_transaction_id(&[odd]), "WB0000001", "for last id {id}");
        }
    }

    #[test]
    fn projection_lists_every_service_and_booth() {
        let mut aggregates = Aggregates::default();
        aggregates.apply(&record(Booth::Wina3, Service::Zanaco, Money::from_kwacha(200)));
        let dashboard = aggregates.project();
        assert_eq!(dashboard.services.len(), Service::ALL.len());
        assert_eq!(dashboard.booths.len(), Booth::ALL.len());
        assert_eq!(dashboard.frequencies.len(), 1);
        assert_eq!(dashboard.total_revenue, Money::from_kwacha(200));
        assert_eq!(dashboard.total_tax, Money::from_kwacha(10));
    }
}
