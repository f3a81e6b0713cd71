use sea_orm::entity::prelude::*;

/// A company listed on the marketplace by its owner.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "businesses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The user who registered and manages this business.
    pub user_id: i32,
    pub name: String,
    /// Legal form of the company, e.g. "PT" or "CV".
    pub business_type: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub founded_at: Option<Date>,
    /// Set whenever a legal requirement analysis has been stored for this business.
    pub legal_analyzed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::product::Entity")]
    Product,
    #[sea_orm(has_many = "super::legal::Entity")]
    Legal,
    #[sea_orm(has_many = "super::financial::Entity")]
    Financial,
    #[sea_orm(has_many = "super::business_additional_info::Entity")]
    AdditionalInfo,
    #[sea_orm(has_many = "super::investment::Entity")]
    Investment,
    #[sea_orm(has_many = "super::missing_legal::Entity")]
    MissingLegal,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::legal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Legal.def()
    }
}

impl Related<super::financial::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Financial.def()
    }
}

impl Related<super::business_additional_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdditionalInfo.def()
    }
}

impl Related<super::investment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investment.def()
    }
}

impl Related<super::missing_legal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MissingLegal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
