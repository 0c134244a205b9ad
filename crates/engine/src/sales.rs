//! Sales engine: admin sale management, eligibility, best-sale pricing, and
//! usage recording.
//!
//! Pricing never records usage. A purchase flow quotes with
//! [`SalesEngine::apply_sale_to_price`] and, once the purchase commits, calls
//! [`SalesEngine::record_sale_usage`], which re-checks eligibility.

use std::sync::Arc;

use arena_core::audit::{action_types, entity_types};
use arena_core::eligibility::{
    evaluate, needs_activity, needs_user_uses, Eligibility, EligibilityFacts,
};
use arena_core::error::CoreError;
use arena_core::roles::{require_role, Actor, Role};
use arena_core::sales::{
    applies_to_product, flash_sale_end, is_currently_active, order_by_priority, validate_bonuses,
    validate_conditions, validate_discount_percent, validate_sale_window, PriceQuote, SaleType,
};
use arena_core::types::{DbId, Timestamp};
use arena_db::models::sale::{CreateFlashSale, CreateSale, Sale, UpdateSale};
use arena_db::models::sale_usage::{CreateSaleUsage, SaleUsage};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::audit::record_outcome;
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::{map_unique_violation, EngineResult};
use crate::store::{AuditSink, PlayerStore, SaleStore};

/// Prefix of generated flash sale keys.
pub const FLASH_SALE_PREFIX: &str = "flash_";

/// Redemption figures for the admin view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleUsageReport {
    pub sale_id: String,
    /// The sale's own counter.
    pub usage_count: i64,
    pub total_uses: i64,
    pub unique_users: i64,
    pub total_discount: i64,
}

pub struct SalesEngine<S> {
    store: S,
    clock: Arc<dyn Clock>,
    config: Arc<EngineConfig>,
}

impl<S> SalesEngine<S>
where
    S: SaleStore + PlayerStore + AuditSink,
{
    pub fn new(store: S, clock: Arc<dyn Clock>, config: Arc<EngineConfig>) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn get(&self, sale_id: &str) -> EngineResult<Sale> {
        self.store
            .find_sale(sale_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", sale_id).into())
    }

    pub async fn list(&self, include_inactive: bool) -> EngineResult<Vec<Sale>> {
        Ok(self.store.list_sales(include_inactive).await?)
    }

    /// Sales live right now, highest priority first.
    pub async fn list_current(&self) -> EngineResult<Vec<Sale>> {
        let now = self.clock.now();
        let mut sales: Vec<Sale> = self
            .store
            .list_current_sales(now)
            .await?
            .into_iter()
            .filter(|s| is_currently_active(s.is_active, s.starts_at, s.ends_at, now))
            .collect();
        order_by_priority(&mut sales, |s| s.priority);
        Ok(sales)
    }

    pub async fn usage_stats(&self, actor: &Actor, sale_id: &str) -> EngineResult<SaleUsageReport> {
        require_role(actor, Role::Moderator)?;
        let sale = self.get(sale_id).await?;
        let stats = self.store.sale_usage_stats(sale_id).await?;
        Ok(SaleUsageReport {
            sale_id: sale.sale_id,
            usage_count: sale.usage_count,
            total_uses: stats.total_uses,
            unique_users: stats.unique_users,
            total_discount: stats.total_discount,
        })
    }

    // -----------------------------------------------------------------------
    // Admin mutations
    // -----------------------------------------------------------------------

    #[tracing::instrument(skip_all, fields(sale_id = %input.sale_id))]
    pub async fn create(&self, actor: &Actor, input: CreateSale) -> EngineResult<Sale> {
        require_role(actor, Role::Admin)?;
        let outcome = self.create_inner(actor, &input).await;
        self.audit_create(actor, &input.sale_id, &outcome, false).await;
        outcome
    }

    /// A sale that is live immediately, with the flash priority and a
    /// generated `flash_<uuid>` key. Duration defaults to the configured
    /// flash length.
    #[tracing::instrument(skip_all, fields(name = %input.name))]
    pub async fn create_flash_sale(
        &self,
        actor: &Actor,
        input: CreateFlashSale,
    ) -> EngineResult<Sale> {
        require_role(actor, Role::Admin)?;
        let sale_id = format!("{FLASH_SALE_PREFIX}{}", Uuid::new_v4().simple());
        let outcome = match self.flash_sale_input(sale_id.clone(), input) {
            Ok(sale) => self.create_inner(actor, &sale).await,
            Err(err) => Err(err),
        };
        self.audit_create(actor, &sale_id, &outcome, true).await;
        outcome
    }

    fn flash_sale_input(
        &self,
        sale_id: String,
        input: CreateFlashSale,
    ) -> EngineResult<CreateSale> {
        input.validate()?;
        let now = self.clock.now();
        let hours = input
            .duration_hours
            .unwrap_or(self.config.flash_sale_duration_hours);
        Ok(CreateSale {
            sale_id,
            name: input.name,
            description: input.description,
            sale_type: SaleType::Flash,
            discount_percent: Some(input.discount_percent),
            bonus_cards: input.bonus_cards,
            bonus_gems: input.bonus_gems,
            applicable_products: input.applicable_products,
            starts_at: now,
            ends_at: flash_sale_end(now, hours)?,
            is_active: Some(true),
            priority: Some(self.config.flash_sale_priority),
            conditions: None,
        })
    }

    async fn create_inner(&self, actor: &Actor, input: &CreateSale) -> EngineResult<Sale> {
        input.validate()?;
        if input.sale_id.trim().is_empty() || input.name.trim().is_empty() {
            return Err(CoreError::Validation("Sale id and name must not be blank".into()).into());
        }
        self.validate_terms(
            input.starts_at,
            input.ends_at,
            input.discount_percent,
            input.bonus_cards,
            input.bonus_gems,
        )?;
        if let Some(conditions) = &input.conditions {
            validate_conditions(conditions)?;
        }

        if self.store.find_sale(&input.sale_id).await?.is_some() {
            return Err(duplicate_sale(&input.sale_id).into());
        }

        let sale = self
            .store
            .create_sale(input, actor.user_id)
            .await
            .map_err(|e| map_unique_violation(e, |_| duplicate_sale(&input.sale_id)))?;

        tracing::info!(
            sale_id = %sale.sale_id,
            sale_type = %sale.sale_type,
            priority = sale.priority,
            "Sale created"
        );
        Ok(sale)
    }

    async fn audit_create(
        &self,
        actor: &Actor,
        sale_id: &str,
        outcome: &EngineResult<Sale>,
        flash: bool,
    ) {
        record_outcome(
            &self.store,
            actor,
            action_types::SALE_CREATE,
            entity_types::SALE,
            Some(sale_id.to_string()),
            outcome,
            |sale| {
                json!({
                    "name": sale.name,
                    "sale_type": sale.sale_type,
                    "discount_percent": sale.discount_percent,
                    "flash": flash,
                })
            },
        )
        .await;
    }

    /// Patch a sale. The merged window, discount, and bonuses are validated.
    #[tracing::instrument(skip_all, fields(sale_id = %sale_id))]
    pub async fn update(&self, actor: &Actor, sale_id: &str, input: UpdateSale) -> EngineResult<Sale> {
        require_role(actor, Role::Admin)?;
        let outcome = self.update_inner(sale_id, &input).await;
        record_outcome(
            &self.store,
            actor,
            action_types::SALE_UPDATE,
            entity_types::SALE,
            Some(sale_id.to_string()),
            &outcome,
            |sale| json!({ "name": sale.name, "is_active": sale.is_active }),
        )
        .await;
        outcome
    }

    async fn update_inner(&self, sale_id: &str, input: &UpdateSale) -> EngineResult<Sale> {
        input.validate()?;
        if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(CoreError::Validation("Sale name must not be blank".into()).into());
        }
        let sale = self.get(sale_id).await?;
        self.validate_terms(
            input.starts_at.unwrap_or(sale.starts_at),
            input.ends_at.unwrap_or(sale.ends_at),
            input.discount_percent.or(sale.discount_percent),
            input.bonus_cards.or(sale.bonus_cards),
            input.bonus_gems.or(sale.bonus_gems),
        )?;
        if let Some(conditions) = &input.conditions {
            validate_conditions(conditions)?;
        }

        let updated = self
            .store
            .update_sale(sale_id, input)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", sale_id))?;
        tracing::info!(sale_id = %sale_id, "Sale updated");
        Ok(updated)
    }

    /// Switch a sale on or off without touching its window.
    #[tracing::instrument(skip_all, fields(sale_id = %sale_id, is_active = is_active))]
    pub async fn set_active(&self, actor: &Actor, sale_id: &str, is_active: bool) -> EngineResult<Sale> {
        require_role(actor, Role::Admin)?;
        let outcome: EngineResult<Sale> = match self.store.set_sale_active(sale_id, is_active).await {
            Ok(Some(sale)) => Ok(sale),
            Ok(None) => Err(CoreError::not_found("Sale", sale_id).into()),
            Err(e) => Err(e.into()),
        };
        record_outcome(
            &self.store,
            actor,
            action_types::SALE_TOGGLE,
            entity_types::SALE,
            Some(sale_id.to_string()),
            &outcome,
            |sale| json!({ "is_active": sale.is_active }),
        )
        .await;
        outcome
    }

    /// Close a running sale now. A sale whose window already closed keeps
    /// its original end.
    #[tracing::instrument(skip_all, fields(sale_id = %sale_id))]
    pub async fn end_early(&self, actor: &Actor, sale_id: &str) -> EngineResult<Sale> {
        require_role(actor, Role::Admin)?;
        let outcome = self.end_early_inner(sale_id).await;
        record_outcome(
            &self.store,
            actor,
            action_types::SALE_END_EARLY,
            entity_types::SALE,
            Some(sale_id.to_string()),
            &outcome,
            |sale| json!({ "ends_at": sale.ends_at }),
        )
        .await;
        outcome
    }

    async fn end_early_inner(&self, sale_id: &str) -> EngineResult<Sale> {
        let sale = self.get(sale_id).await?;
        let now = self.clock.now();
        if now < sale.starts_at {
            return Err(CoreError::InvalidTransition(format!(
                "Sale '{sale_id}' has not started; switch it off instead"
            ))
            .into());
        }
        let ended = self
            .store
            .end_sale(sale_id, now.min(sale.ends_at))
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", sale_id))?;
        tracing::info!(sale_id = %sale_id, "Sale ended early");
        Ok(ended)
    }

    /// Remove a sale permanently. Redemption history is kept.
    #[tracing::instrument(skip_all, fields(sale_id = %sale_id))]
    pub async fn delete(&self, actor: &Actor, sale_id: &str) -> EngineResult<()> {
        require_role(actor, Role::Superadmin)?;
        let outcome: EngineResult<()> = match self.store.delete_sale(sale_id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(CoreError::not_found("Sale", sale_id).into()),
            Err(e) => Err(e.into()),
        };
        record_outcome(
            &self.store,
            actor,
            action_types::SALE_DELETE,
            entity_types::SALE,
            Some(sale_id.to_string()),
            &outcome,
            |_| json!({}),
        )
        .await;
        if outcome.is_ok() {
            tracing::info!(sale_id = %sale_id, "Sale deleted");
        }
        outcome
    }

    /// Switch off every sale whose window has closed.
    pub async fn deactivate_expired(&self) -> EngineResult<u64> {
        let deactivated = self.store.deactivate_expired_sales(self.clock.now()).await?;
        if deactivated > 0 {
            tracing::info!(deactivated, "Expired sales deactivated");
        }
        Ok(deactivated)
    }

    fn validate_terms(
        &self,
        starts_at: Timestamp,
        ends_at: Timestamp,
        discount_percent: Option<i32>,
        bonus_cards: Option<i32>,
        bonus_gems: Option<i32>,
    ) -> Result<(), CoreError> {
        validate_sale_window(starts_at, ends_at)?;
        validate_discount_percent(discount_percent, self.config.max_discount_percent)?;
        validate_bonuses(bonus_cards, bonus_gems)
    }

    // -----------------------------------------------------------------------
    // Eligibility, pricing, usage
    // -----------------------------------------------------------------------

    /// Whether `user_id` may redeem `sale_id` under its conditions.
    pub async fn can_use_sale(&self, user_id: DbId, sale_id: &str) -> EngineResult<Eligibility> {
        let sale = self.get(sale_id).await?;
        self.eligibility(user_id, &sale).await
    }

    async fn eligibility(&self, user_id: DbId, sale: &Sale) -> EngineResult<Eligibility> {
        let conditions = sale.conditions();
        let mut facts = EligibilityFacts::default();
        if let Some(conditions) = conditions {
            if needs_user_uses(conditions) {
                facts.user_uses = Some(
                    self.store
                        .count_user_sale_usages(&sale.sale_id, user_id)
                        .await?,
                );
            }
            if needs_activity(conditions) {
                facts.activity = self.store.find_player(user_id).await?.map(|p| p.activity());
            }
        }

        Ok(evaluate(
            conditions,
            sale.usage_count,
            &facts,
            self.clock.now(),
            &self.config.audience_policy(),
        ))
    }

    /// Quote `product_id` for `user_id` under the best sale.
    ///
    /// Live sales covering the product are walked by priority and the first
    /// one the user is eligible for wins, regardless of discount size.
    #[tracing::instrument(skip_all, fields(user_id = user_id, product_id = %product_id))]
    pub async fn apply_sale_to_price(
        &self,
        user_id: DbId,
        product_id: &str,
        gold_price: Option<i64>,
        gem_price: Option<i64>,
    ) -> EngineResult<PriceQuote> {
        if gold_price.is_some_and(|p| p < 0) || gem_price.is_some_and(|p| p < 0) {
            return Err(CoreError::Validation("Prices must not be negative".into()).into());
        }

        let candidates: Vec<Sale> = self
            .list_current()
            .await?
            .into_iter()
            .filter(|s| applies_to_product(&s.applicable_products, product_id))
            .collect();

        for sale in &candidates {
            let eligibility = self.eligibility(user_id, sale).await?;
            if eligibility.can_use {
                tracing::debug!(sale_id = %sale.sale_id, "Sale applied to price");
                return Ok(PriceQuote::with_sale(
                    gold_price,
                    gem_price,
                    &sale.sale_id,
                    sale.discount_percent,
                    sale.bonus_cards,
                    sale.bonus_gems,
                ));
            }
            tracing::debug!(
                sale_id = %sale.sale_id,
                reason = eligibility.reason.as_deref(),
                "Sale skipped"
            );
        }

        Ok(PriceQuote::undiscounted(gold_price, gem_price))
    }

    /// Record a committed purchase under `sale_id`.
    ///
    /// The sale must still be live and the user still eligible; otherwise
    /// this fails with `SaleUnavailable` and nothing is written.
    #[tracing::instrument(skip_all, fields(user_id = user_id, sale_id = %sale_id))]
    pub async fn record_sale_usage(
        &self,
        user_id: DbId,
        sale_id: &str,
        product_id: &str,
        original_price: i64,
        discounted_price: i64,
    ) -> EngineResult<SaleUsage> {
        if original_price < 0 || discounted_price < 0 || discounted_price > original_price {
            return Err(CoreError::Validation(format!(
                "Invalid prices: original {original_price}, discounted {discounted_price}"
            ))
            .into());
        }

        let sale = self.get(sale_id).await?;
        let now = self.clock.now();
        if !is_currently_active(sale.is_active, sale.starts_at, sale.ends_at, now) {
            return Err(CoreError::SaleUnavailable("Sale is not active".into()).into());
        }
        let eligibility = self.eligibility(user_id, &sale).await?;
        if !eligibility.can_use {
            return Err(CoreError::SaleUnavailable(eligibility.reason.unwrap_or_default()).into());
        }

        let usage = self
            .store
            .record_sale_usage(&CreateSaleUsage {
                user_id,
                sale_id: sale_id.to_string(),
                product_id: product_id.to_string(),
                original_price,
                discounted_price,
                used_at: now,
            })
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", sale_id))?;

        tracing::info!(
            user_id,
            sale_id = %sale_id,
            discount = usage.discount_amount,
            "Sale usage recorded"
        );
        Ok(usage)
    }
}

fn duplicate_sale(sale_id: &str) -> CoreError {
    CoreError::DuplicateKey(format!("Sale '{sale_id}' already exists"))
}
