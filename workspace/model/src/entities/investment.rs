use sea_orm::entity::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Lifecycle of an investment. Only `Active` and `Exited` carry timestamp side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum InvestmentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "funded")]
    Funded,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "exited")]
    Exited,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl InvestmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestmentStatus::Pending => "pending",
            InvestmentStatus::Approved => "approved",
            InvestmentStatus::Funded => "funded",
            InvestmentStatus::Active => "active",
            InvestmentStatus::Exited => "exited",
            InvestmentStatus::Rejected => "rejected",
            InvestmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InvestmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status string does not name a known [`InvestmentStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownInvestmentStatus(pub String);

impl fmt::Display for UnknownInvestmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown investment status '{}'", self.0)
    }
}

impl std::error::Error for UnknownInvestmentStatus {}

impl FromStr for InvestmentStatus {
    type Err = UnknownInvestmentStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(InvestmentStatus::Pending),
            "approved" => Ok(InvestmentStatus::Approved),
            "funded" => Ok(InvestmentStatus::Funded),
            "active" => Ok(InvestmentStatus::Active),
            "exited" => Ok(InvestmentStatus::Exited),
            "rejected" => Ok(InvestmentStatus::Rejected),
            "cancelled" => Ok(InvestmentStatus::Cancelled),
            _ => Err(UnknownInvestmentStatus(s.to_string())),
        }
    }
}

/// A stake placed by an investor in a listed business.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "investments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub investor_id: i32,
    pub business_id: i32,
    pub amount: Decimal,
    pub status: InvestmentStatus,
    /// Set when the investment becomes active.
    pub time_bought: Option<DateTimeUtc>,
    /// Set when the investor exits.
    pub time_sold: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::InvestorId",
        to = "super::user::Column::Id"
    )]
    Investor,
    #[sea_orm(
        belongs_to = "super::business::Entity",
        from = "Column::BusinessId",
        to = "super::business::Column::Id"
    )]
    Business,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investor.def()
    }
}

impl Related<super::business::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Business.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
