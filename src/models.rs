use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The six fixed mobile booths. Unknown booth codes are unrepresentable:
/// deserialization of anything else fails before a handler sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Booth {
    Wina1,
    Wina2,
    Wina3,
    Wina4,
    Wina5,
    Wina6,
}

impl Booth {
    pub const ALL: [Booth; 6] = [
        Booth::Wina1,
        Booth::Wina2,
        Booth::Wina3,
        Booth::Wina4,
        Booth::Wina5,
        Booth::Wina6,
    ];

    pub fn location(self) -> &'static str {
        match self {
            Booth::Wina1 => "Lusaka CPD",
            Booth::Wina2 => "Libala",
            Booth::Wina3 => "Kabwata",
            Booth::Wina4 => "Mandevu",
            Booth::Wina5 => "Woodlands",
            Booth::Wina6 => "Matero East",
        }
    }

    /// Services offered at this booth. Pairs outside this table are rejected.
    pub fn services(self) -> &'static [Service] {
        use Service::*;
        match self {
            Booth::Wina1 => &[AirtelMoney, MtnMoney, ZamtelMoney, Zanaco, Fnb],
            Booth::Wina2 => &[AirtelMoney, MtnMoney, ZamtelMoney, Fnb],
            Booth::Wina3 => &[AirtelMoney, MtnMoney, ZamtelMoney, Zanaco, Fnb],
            Booth::Wina4 => &[AirtelMoney, MtnMoney, ZamtelMoney],
            Booth::Wina5 => &[AirtelMoney, MtnMoney, Zanaco, Fnb],
            Booth::Wina6 => &[AirtelMoney, MtnMoney, ZamtelMoney],
        }
    }

    pub fn offers(self, service: Service) -> bool {
        self.services().contains(&service)
    }
}

impl fmt::Display for Booth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The five mobile-money services, each with a fixed monthly cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Service {
    #[serde(rename = "Airtel Money")]
    AirtelMoney,
    #[serde(rename = "MTN Money")]
    MtnMoney,
    #[serde(rename = "Zamtel Money")]
    ZamtelMoney,
    #[serde(rename = "Zanaco")]
    Zanaco,
    #[serde(rename = "FNB")]
    Fnb,
}

impl Service {
    pub const ALL: [Service; 5] = [
        Service::AirtelMoney,
        Service::MtnMoney,
        Service::ZamtelMoney,
        Service::Zanaco,
        Service::Fnb,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Service::AirtelMoney => "Airtel Money",
            Service::MtnMoney => "MTN Money",
            Service::ZamtelMoney => "Zamtel Money",
            Service::Zanaco => "Zanaco",
            Service::Fnb => "FNB",
        }
    }

    /// Static policy constant, not derived from data.
    pub fn monthly_cap(self) -> Money {
        match self {
            Service::AirtelMoney => Money::from_kwacha(350_000),
            Service::MtnMoney => Money::from_kwacha(160_000),
            Service::ZamtelMoney => Money::from_kwacha(70_000),
            Service::Zanaco => Money::from_kwacha(80_000),
            Service::Fnb => Money::from_kwacha(80_000),
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
}

/// One committed transaction. Append-only, never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub booth: Booth,
    pub service: Service,
    pub amount: Money,
    pub tax: Money,
    pub location: String,
    pub timestamp: String,
}

/// Everything persisted to the data file: the user list, the session markers,
/// and the append-only transaction list. One document, whole-file writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub current_user: Option<String>,
    #[serde(default)]
    pub remembered_user: Option<String>,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub current_user: Option<String>,
    pub remembered_user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    pub booth: Booth,
    pub service: Service,
    pub amount: Money,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub ok: bool,
    pub id: String,
    pub amount: Money,
    pub tax: Money,
    /// Tax shown against the K1000 threshold, clamped to 100.
    pub tax_percent: f64,
    pub remaining: Money,
}

#[derive(Debug, Serialize)]
pub struct TransactionListResponse {
    pub ok: bool,
    pub data: Vec<TransactionRecord>,
}

#[derive(Debug, Serialize)]
pub struct ServiceUsageRow {
    pub service: Service,
    pub limit: Money,
    pub used: Money,
    pub remaining: Money,
    pub tax: Money,
}

#[derive(Debug, Serialize)]
pub struct BoothRevenueRow {
    pub booth: Booth,
    pub location: &'static str,
    pub revenue: Money,
}

#[derive(Debug, Serialize)]
pub struct FrequencyRow {
    pub booth: Booth,
    pub service: Service,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub services: Vec<ServiceUsageRow>,
    pub booths: Vec<BoothRevenueRow>,
    pub frequencies: Vec<FrequencyRow>,
    pub total_revenue: Money,
    pub total_tax: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_booth_offers_airtel_and_mtn() {
        for booth in Booth::ALL {
            assert!(booth.offers(Service::AirtelMoney));
            assert!(booth.offers(Service::MtnMoney));
        }
    }

    #[test]
    fn unoffered_pairs_are_rejected_by_the_table() {
        assert!(!Booth::Wina4.offers(Service::Zanaco));
        assert!(!Booth::Wina6.offers(Service::Fnb));
        assert!(!Booth::Wina5.offers(Service::ZamtelMoney));
    }

    #[test]
    fn service_names_round_trip_through_json() {
        for service in Service::ALL {
            let json = serde_json::to_string(&service).unwrap();
            assert_eq!(json, format!("\"{}\"", service.name()));
            let back: Service = serde_json::from_str(&json).unwrap();
            assert_eq!(back, service);
        }
    }

    #[test]
    fn unknown_service_fails_to_deserialize() {
        assert!(serde_json::from_str::<Service>("\"Barclays\"").is_err());
        assert!(serde_json::from_str::<Booth>("\"Wina7\"").is_err());
    }
}
