//! Legal requirement reconciliation.
//!
//! A list of required documents (produced by the AI provider) is compared
//! against the documents a business and its products have actually filed.
//! Requirements that are met are reported without remediation steps; the
//! unmet ones keep their steps and can be persisted so later reads do not
//! need the provider at all.
//!
//! Persisting always replaces the whole previous analysis of the business.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use common::{LegalComparison, LegalRequirement, LegalStep, ProductLegalRequirements};
use model::entities::{
    business, legal, missing_legal, missing_legal_step, missing_product_legal,
    missing_product_legal_step, product, product_legal,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{debug, info, instrument, trace};

use crate::error::{ComputeError, Result};

/// Find the product a required-document block refers to.
///
/// The provider only knows product names, and those rarely match verbatim.
/// An exact case-insensitive match wins; otherwise the first product whose
/// name contains the requested name. A requested name that merely contains a
/// product's name is not a match. Products are expected in id order.
pub fn match_product<'a>(products: &'a [product::Model], requested: &str) -> Option<&'a product::Model> {
    let needle = requested.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let names: Vec<(String, &product::Model)> = products
        .iter()
        .map(|p| (p.name.trim().to_lowercase(), p))
        .collect();

    names
        .iter()
        .find(|(name, _)| *name == needle)
        .or_else(|| names.iter().find(|(name, _)| name.contains(&needle)))
        .map(|(_, p)| *p)
}

/// Renumber steps 1..n in their given order.
fn renumber(steps: &[LegalStep]) -> Vec<LegalStep> {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| LegalStep {
            step_number: i as i32 + 1,
            description: step.description.clone(),
            redirect_url: step.redirect_url.clone(),
        })
        .collect()
}

/// Tag each requirement against the set of filed document types.
///
/// Type comparison is exact. Repeated types keep their first occurrence.
pub fn classify(required: &[LegalRequirement], filed: &HashSet<String>) -> Vec<LegalRequirement> {
    let mut seen = HashSet::new();
    required
        .iter()
        .filter(|r| seen.insert(r.legal_type.clone()))
        .map(|r| {
            let has_legal = filed.contains(&r.legal_type);
            LegalRequirement {
                legal_type: r.legal_type.clone(),
                has_legal,
                notes: r.notes.clone(),
                steps: if has_legal { Vec::new() } else { renumber(&r.steps) },
            }
        })
        .collect()
}

/// Combine filed documents with stored missing rows. A stored missing type
/// that has been filed since is reported as present.
fn merge(
    filed: Vec<(String, Option<String>)>,
    missing: Vec<(String, Option<String>, Vec<LegalStep>)>,
) -> Vec<LegalRequirement> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for (legal_type, notes) in filed {
        if seen.insert(legal_type.clone()) {
            merged.push(LegalRequirement::satisfied(legal_type, notes));
        }
    }
    for (legal_type, notes, steps) in missing {
        if seen.insert(legal_type.clone()) {
            merged.push(LegalRequirement {
                legal_type,
                has_legal: false,
                notes,
                steps,
            });
        }
    }
    merged
}

async fn find_business<C: ConnectionTrait>(db: &C, business_id: i32) -> Result<business::Model> {
    business::Entity::find_by_id(business_id)
        .filter(business::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(ComputeError::BusinessNotFound(business_id))
}

async fn active_products<C: ConnectionTrait>(db: &C, business_id: i32) -> Result<Vec<product::Model>> {
    let products = product::Entity::find()
        .filter(product::Column::BusinessId.eq(business_id))
        .filter(product::Column::DeletedAt.is_null())
        .order_by_asc(product::Column::Id)
        .all(db)
        .await?;
    Ok(products)
}

/// Compare `required` with what the business has on file.
///
/// The provider's own `has_legal` flags are ignored. Product blocks that
/// match no product are dropped.
#[instrument(skip(db, required))]
pub async fn reconcile<C: ConnectionTrait>(
    db: &C,
    business_id: i32,
    required: &LegalComparison,
) -> Result<LegalComparison> {
    find_business(db, business_id).await?;

    let filed: HashSet<String> = legal::Entity::find()
        .filter(legal::Column::BusinessId.eq(business_id))
        .all(db)
        .await?
        .into_iter()
        .map(|l| l.legal_type)
        .collect();
    trace!("Business {} has {} filed document types", business_id, filed.len());

    let products = active_products(db, business_id).await?;
    let product_ids: Vec<i32> = products.iter().map(|p| p.id).collect();
    let mut filed_by_product: HashMap<i32, HashSet<String>> = HashMap::new();
    for doc in product_legal::Entity::find()
        .filter(product_legal::Column::ProductId.is_in(product_ids))
        .all(db)
        .await?
    {
        filed_by_product
            .entry(doc.product_id)
            .or_default()
            .insert(doc.legal_type);
    }

    // Blocks naming the same product are folded together
    let mut product_blocks: Vec<(i32, ProductLegalRequirements)> = Vec::new();
    for block in &required.products {
        let Some(matched) = match_product(&products, &block.product_name) else {
            debug!(
                "Dropping requirements for unknown product '{}' of business {}",
                block.product_name, business_id
            );
            continue;
        };

        let empty = HashSet::new();
        let filed_types = filed_by_product.get(&matched.id).unwrap_or(&empty);

        match product_blocks.iter().position(|(id, _)| *id == matched.id) {
            Some(index) => {
                let existing = &mut product_blocks[index].1;
                let mut combined = existing.required.clone();
                combined.extend(block.required.iter().cloned());
                existing.required = classify(&combined, filed_types);
            }
            None => product_blocks.push((
                matched.id,
                ProductLegalRequirements {
                    product_name: matched.name.clone(),
                    required: classify(&block.required, filed_types),
                },
            )),
        }
    }

    let comparison = LegalComparison {
        required: classify(&required.required, &filed),
        products: product_blocks.into_iter().map(|(_, block)| block).collect(),
    };
    debug!(
        "Reconciled business {}: {} requirement(s) missing",
        business_id,
        comparison.missing_count()
    );
    Ok(comparison)
}

/// Replace the stored analysis of a business with the missing half of `comparison`.
#[instrument(skip(db, comparison))]
pub async fn persist<C>(db: &C, business_id: i32, comparison: &LegalComparison) -> Result<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let now = Utc::now();

    let business = find_business(&txn, business_id).await?;
    let products = active_products(&txn, business_id).await?;

    // Clear the previous analysis, including rows of products deleted since
    let stale_business: Vec<i32> = missing_legal::Entity::find()
        .filter(missing_legal::Column::BusinessId.eq(business_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();
    if !stale_business.is_empty() {
        missing_legal_step::Entity::delete_many()
            .filter(missing_legal_step::Column::MissingLegalId.is_in(stale_business.clone()))
            .exec(&txn)
            .await
            .map_err(|e| ComputeError::from_write("Clearing missing legal steps", e))?;
        missing_legal::Entity::delete_many()
            .filter(missing_legal::Column::Id.is_in(stale_business))
            .exec(&txn)
            .await
            .map_err(|e| ComputeError::from_write("Clearing missing legals", e))?;
    }

    let all_product_ids: Vec<i32> = product::Entity::find()
        .filter(product::Column::BusinessId.eq(business_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();
    let stale_product: Vec<i32> = missing_product_legal::Entity::find()
        .filter(missing_product_legal::Column::ProductId.is_in(all_product_ids))
        .all(&txn)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();
    if !stale_product.is_empty() {
        missing_product_legal_step::Entity::delete_many()
            .filter(
                missing_product_legal_step::Column::MissingProductLegalId
                    .is_in(stale_product.clone()),
            )
            .exec(&txn)
            .await
            .map_err(|e| ComputeError::from_write("Clearing missing product legal steps", e))?;
        missing_product_legal::Entity::delete_many()
            .filter(missing_product_legal::Column::Id.is_in(stale_product))
            .exec(&txn)
            .await
            .map_err(|e| ComputeError::from_write("Clearing missing product legals", e))?;
    }

    let mut stored = 0usize;
    let mut seen = HashSet::new();
    for requirement in required_missing(&comparison.required) {
        if !seen.insert(requirement.legal_type.clone()) {
            continue;
        }
        let parent = missing_legal::ActiveModel {
            business_id: Set(business_id),
            legal_type: Set(requirement.legal_type.clone()),
            notes: Set(requirement.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for step in renumber(&requirement.steps) {
            missing_legal_step::ActiveModel {
                missing_legal_id: Set(parent.id),
                step_number: Set(step.step_number),
                description: Set(step.description),
                redirect_url: Set(step.redirect_url),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
        stored += 1;
    }

    let mut seen_product = HashSet::new();
    for block in &comparison.products {
        let Some(matched) = match_product(&products, &block.product_name) else {
            debug!("Not storing requirements for unknown product '{}'", block.product_name);
            continue;
        };

        for requirement in required_missing(&block.required) {
            if !seen_product.insert((matched.id, requirement.legal_type.clone())) {
                continue;
            }
            let parent = missing_product_legal::ActiveModel {
                product_id: Set(matched.id),
                legal_type: Set(requirement.legal_type.clone()),
                notes: Set(requirement.notes.clone()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;

            for step in renumber(&requirement.steps) {
                missing_product_legal_step::ActiveModel {
                    missing_product_legal_id: Set(parent.id),
                    step_number: Set(step.step_number),
                    description: Set(step.description),
                    redirect_url: Set(step.redirect_url),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
            }
            stored += 1;
        }
    }

    let mut stamped: business::ActiveModel = business.into();
    stamped.legal_analyzed_at = Set(Some(now));
    stamped.update(&txn).await?;

    txn.commit().await?;
    info!("Stored {} missing requirement(s) for business {}", stored, business_id);
    Ok(())
}

fn required_missing(requirements: &[LegalRequirement]) -> impl Iterator<Item = &LegalRequirement> {
    requirements.iter().filter(|r| !r.has_legal)
}

/// Rebuild the last stored comparison without consulting the provider.
///
/// Returns `None` when the business has never been analysed.
#[instrument(skip(db))]
pub async fn load<C: ConnectionTrait>(db: &C, business_id: i32) -> Result<Option<LegalComparison>> {
    let business = find_business(db, business_id).await?;
    if business.legal_analyzed_at.is_none() {
        trace!("Business {} has no stored legal analysis", business_id);
        return Ok(None);
    }

    let filed: Vec<(String, Option<String>)> = legal::Entity::find()
        .filter(legal::Column::BusinessId.eq(business_id))
        .order_by_asc(legal::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|l| (l.legal_type, l.notes))
        .collect();

    let missing_rows = missing_legal::Entity::find()
        .filter(missing_legal::Column::BusinessId.eq(business_id))
        .order_by_asc(missing_legal::Column::Id)
        .all(db)
        .await?;
    let mut steps_by_parent: HashMap<i32, Vec<LegalStep>> = HashMap::new();
    for step in missing_legal_step::Entity::find()
        .filter(
            missing_legal_step::Column::MissingLegalId
                .is_in(missing_rows.iter().map(|m| m.id).collect::<Vec<_>>()),
        )
        .order_by_asc(missing_legal_step::Column::StepNumber)
        .all(db)
        .await?
    {
        steps_by_parent.entry(step.missing_legal_id).or_default().push(LegalStep {
            step_number: step.step_number,
            description: step.description,
            redirect_url: step.redirect_url,
        });
    }
    let missing: Vec<(String, Option<String>, Vec<LegalStep>)> = missing_rows
        .into_iter()
        .map(|m| {
            let steps = steps_by_parent.remove(&m.id).unwrap_or_default();
            (m.legal_type, m.notes, steps)
        })
        .collect();

    let products = active_products(db, business_id).await?;
    let product_ids: Vec<i32> = products.iter().map(|p| p.id).collect();

    let mut filed_by_product: HashMap<i32, Vec<(String, Option<String>)>> = HashMap::new();
    for doc in product_legal::Entity::find()
        .filter(product_legal::Column::ProductId.is_in(product_ids.clone()))
        .order_by_asc(product_legal::Column::Id)
        .all(db)
        .await?
    {
        filed_by_product
            .entry(doc.product_id)
            .or_default()
            .push((doc.legal_type, doc.notes));
    }

    let missing_product_rows = missing_product_legal::Entity::find()
        .filter(missing_product_legal::Column::ProductId.is_in(product_ids))
        .order_by_asc(missing_product_legal::Column::Id)
        .all(db)
        .await?;
    let mut product_steps: HashMap<i32, Vec<LegalStep>> = HashMap::new();
    for step in missing_product_legal_step::Entity::find()
        .filter(
            missing_product_legal_step::Column::MissingProductLegalId
                .is_in(missing_product_rows.iter().map(|m| m.id).collect::<Vec<_>>()),
        )
        .order_by_asc(missing_product_legal_step::Column::StepNumber)
        .all(db)
        .await?
    {
        product_steps
            .entry(step.missing_product_legal_id)
            .or_default()
            .push(LegalStep {
                step_number: step.step_number,
                description: step.description,
                redirect_url: step.redirect_url,
            });
    }
    let mut missing_by_product: HashMap<i32, Vec<(String, Option<String>, Vec<LegalStep>)>> =
        HashMap::new();
    for row in missing_product_rows {
        let steps = product_steps.remove(&row.id).unwrap_or_default();
        missing_by_product
            .entry(row.product_id)
            .or_default()
            .push((row.legal_type, row.notes, steps));
    }

    let product_blocks = products
        .into_iter()
        .filter_map(|p| {
            let required = merge(
                filed_by_product.remove(&p.id).unwrap_or_default(),
                missing_by_product.remove(&p.id).unwrap_or_default(),
            );
            (!required.is_empty()).then(|| ProductLegalRequirements {
                product_name: p.name,
                required,
            })
        })
        .collect();

    Ok(Some(LegalComparison {
        required: merge(filed, missing),
        products: product_blocks,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_business, seed_legal, seed_product, seed_product_legal, setup_db};
    use sea_orm::PaginatorTrait;

    fn step(description: &str) -> LegalStep {
        LegalStep {
            step_number: 0,
            description: description.to_string(),
            redirect_url: None,
        }
    }

    fn requirement(legal_type: &str, steps: &[&str]) -> LegalRequirement {
        LegalRequirement {
            legal_type: legal_type.to_string(),
            // Deliberately wrong: reconciliation must recompute this flag
            has_legal: true,
            notes: Some(format!("{} is mandatory", legal_type)),
            steps: steps.iter().map(|s| step(s)).collect(),
        }
    }

    fn product_block(name: &str, required: Vec<LegalRequirement>) -> ProductLegalRequirements {
        ProductLegalRequirements {
            product_name: name.to_string(),
            required,
        }
    }

    #[test]
    fn test_match_product_prefers_exact_then_substring() {
        let now = Utc::now();
        let make = |id: i32, name: &str| product::Model {
            id,
            business_id: 1,
            name: name.to_string(),
            description: None,
            category: None,
            unit: None,
            hpp: None,
            revenue: None,
            profit: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let products = vec![make(1, "Sambal Bawang Pedas"), make(2, "Sambal"), make(3, "Keripik")];

        assert_eq!(match_product(&products, "sambal").map(|p| p.id), Some(2));
        assert_eq!(match_product(&products, "Bawang").map(|p| p.id), Some(1));
        assert!(match_product(&products, "Keripik Singkong 100g").is_none());
        assert!(match_product(&products, "Kopi").is_none());
        assert!(match_product(&products, "  ").is_none());
    }

    #[test]
    fn test_classify_renumbers_missing_and_clears_present() {
        let filed: HashSet<String> = ["Halal".to_string()].into_iter().collect();
        let required = vec![
            requirement("Halal", &["apply"]),
            LegalRequirement {
                steps: vec![
                    LegalStep { step_number: 7, ..step("collect documents") },
                    LegalStep { step_number: 3, ..step("submit online") },
                ],
                ..requirement("BPOM", &[])
            },
            requirement("halal", &["lowercase is a different type"]),
            requirement("Halal", &["duplicate"]),
        ];

        let tagged = classify(&required, &filed);

        assert_eq!(tagged.len(), 3);
        assert!(tagged[0].has_legal);
        assert!(tagged[0].steps.is_empty());
        assert!(!tagged[1].has_legal);
        assert_eq!(
            tagged[1].steps.iter().map(|s| s.step_number).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(tagged[1].steps[1].description, "submit online");
        assert!(!tagged[2].has_legal);
    }

    #[tokio::test]
    async fn test_existing_document_satisfies_requirement() {
        let db = setup_db().await;
        let business = seed_business(&db, "Dapur Nusantara").await;
        seed_legal(&db, business.id, "Halal").await;

        let required = LegalComparison {
            required: vec![requirement("Halal", &["register at BPJPH"]), requirement("NIB", &["open OSS", "submit"])],
            products: vec![],
        };
        let result = reconcile(&db, business.id, &required).await.unwrap();

        assert_eq!(result.required[0].legal_type, "Halal");
        assert!(result.required[0].has_legal);
        assert!(result.required[0].steps.is_empty());
        assert!(!result.required[1].has_legal);
        assert_eq!(result.required[1].steps.len(), 2);
        assert_eq!(result.required[1].steps[0].step_number, 1);
    }

    #[tokio::test]
    async fn test_product_requirements_use_fuzzy_match_and_drop_unknown() {
        let db = setup_db().await;
        let business = seed_business(&db, "Dapur Nusantara").await;
        let sambal = seed_product(&db, business.id, "Sambal Roa Botol").await;
        seed_product_legal(&db, sambal.id, "PIRT").await;

        let required = LegalComparison {
            required: vec![],
            products: vec![
                product_block("sambal roa", vec![requirement("PIRT", &[]), requirement("Halal", &["audit"])]),
                product_block("Rendang Kaleng", vec![requirement("BPOM", &["register"])]),
            ],
        };
        let result = reconcile(&db, business.id, &required).await.unwrap();

        assert_eq!(result.products.len(), 1);
        let block = &result.products[0];
        assert_eq!(block.product_name, "Sambal Roa Botol");
        assert!(block.required[0].has_legal);
        assert!(!block.required[1].has_legal);
        assert_eq!(block.required[1].steps[0].step_number, 1);
    }

    #[tokio::test]
    async fn test_short_product_name_does_not_claim_longer_request() {
        let db = setup_db().await;
        let business = seed_business(&db, "Dapur Nusantara").await;
        seed_product(&db, business.id, "Gula").await;

        let required = LegalComparison {
            required: vec![],
            products: vec![product_block("Kopi Susu Gula Aren", vec![requirement("PIRT", &["apply"])])],
        };
        let result = reconcile(&db, business.id, &required).await.unwrap();
        assert!(result.products.is_empty());

        persist(&db, business.id, &result).await.unwrap();
        let stored = missing_product_legal::Entity::find().all(&db).await.unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_unknown_business() {
        let db = setup_db().await;
        let result = reconcile(&db, 999, &LegalComparison::default()).await;
        assert!(matches!(result, Err(ComputeError::BusinessNotFound(999))));
    }

    #[tokio::test]
    async fn test_load_before_any_analysis_is_none() {
        let db = setup_db().await;
        let business = seed_business(&db, "Dapur Nusantara").await;
        assert!(load(&db, business.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persist_is_idempotent() {
        let db = setup_db().await;
        let business = seed_business(&db, "Dapur Nusantara").await;
        seed_product(&db, business.id, "Sambal Roa").await;

        let required = LegalComparison {
            required: vec![requirement("NIB", &["one", "two"]), requirement("NPWP", &["one"])],
            products: vec![product_block("Sambal Roa", vec![requirement("PIRT", &["a", "b", "c"])])],
        };
        let reconciled = reconcile(&db, business.id, &required).await.unwrap();

        persist(&db, business.id, &reconciled).await.unwrap();
        let first = load(&db, business.id).await.unwrap().unwrap();
        let counts_first = (
            missing_legal::Entity::find().count(&db).await.unwrap(),
            missing_legal_step::Entity::find().count(&db).await.unwrap(),
            missing_product_legal::Entity::find().count(&db).await.unwrap(),
            missing_product_legal_step::Entity::find().count(&db).await.unwrap(),
        );

        persist(&db, business.id, &reconciled).await.unwrap();
        let second = load(&db, business.id).await.unwrap().unwrap();
        let counts_second = (
            missing_legal::Entity::find().count(&db).await.unwrap(),
            missing_legal_step::Entity::find().count(&db).await.unwrap(),
            missing_product_legal::Entity::find().count(&db).await.unwrap(),
            missing_product_legal_step::Entity::find().count(&db).await.unwrap(),
        );

        assert_eq!(counts_first, (2, 3, 1, 3));
        assert_eq!(counts_first, counts_second);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_load_merges_filed_and_missing() {
        let db = setup_db().await;
        let business = seed_business(&db, "Dapur Nusantara").await;
        let sambal = seed_product(&db, business.id, "Sambal Roa").await;
        seed_legal(&db, business.id, "NIB").await;

        let required = LegalComparison {
            required: vec![requirement("NIB", &[]), requirement("NPWP", &["register", "verify"])],
            products: vec![product_block("Sambal Roa", vec![requirement("Halal", &["audit"])])],
        };
        let reconciled = reconcile(&db, business.id, &required).await.unwrap();
        persist(&db, business.id, &reconciled).await.unwrap();

        let loaded = load(&db, business.id).await.unwrap().unwrap();
        assert_eq!(loaded.required.len(), 2);
        assert_eq!(loaded.required[0].legal_type, "NIB");
        assert!(loaded.required[0].has_legal);
        assert_eq!(loaded.required[1].legal_type, "NPWP");
        assert_eq!(
            loaded.required[1].steps.iter().map(|s| s.description.as_str()).collect::<Vec<_>>(),
            vec!["register", "verify"]
        );
        assert_eq!(loaded.products[0].required[0].legal_type, "Halal");
        assert!(!loaded.products[0].required[0].has_legal);

        // Filing the missing document flips it to present without a new analysis
        seed_product_legal(&db, sambal.id, "Halal").await;
        let reloaded = load(&db, business.id).await.unwrap().unwrap();
        assert!(reloaded.products[0].required[0].has_legal);
        assert!(reloaded.products[0].required[0].steps.is_empty());
        assert_eq!(reloaded.products[0].required.len(), 1);
    }
}
