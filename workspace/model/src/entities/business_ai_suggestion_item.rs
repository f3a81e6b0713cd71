use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "business_ai_suggestion_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub suggestion_id: i32,
    pub suggestion: String,
    pub category: String,
    /// "high", "medium" or "low" as returned by the provider.
    pub priority: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::business_ai_suggestion::Entity",
        from = "Column::SuggestionId",
        to = "super::business_ai_suggestion::Column::Id"
    )]
    Suggestion,
}

impl Related<super::business_ai_suggestion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suggestion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
