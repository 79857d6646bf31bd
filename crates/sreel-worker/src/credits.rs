//! Credit handling around the generation pipeline.
//!
//! The balance precondition runs before any work. The single charge happens
//! once the narration duration is known. Compensating refunds are issued per
//! failed segment and for a failed caption stage; legitimately performed
//! compute is never refunded.

use tracing::{info, warn};

use sreel_ledger::CreditLedger;
use sreel_models::CostBreakdown;

use crate::error::{WorkerError, WorkerResult};

/// Verify the user can afford the job. Rejected jobs have done no work and
/// need no cleanup.
pub async fn ensure_balance(
    ledger: &dyn CreditLedger,
    user_id: &str,
    breakdown: &CostBreakdown,
) -> WorkerResult<()> {
    let available = ledger.balance(user_id).await?;
    if available < i64::from(breakdown.total) {
        return Err(WorkerError::InsufficientCredits {
            needed: breakdown.total,
            available,
        });
    }
    Ok(())
}

/// Charge the full job cost. The precondition check is the only balance
/// gate; a concurrent job may drive the balance negative here.
pub async fn charge_generation(
    ledger: &dyn CreditLedger,
    user_id: &str,
    breakdown: &CostBreakdown,
) -> WorkerResult<()> {
    ledger
        .charge(user_id, breakdown.total, &breakdown.to_description())
        .await?;
    info!(
        user_id = %user_id,
        credits = breakdown.total,
        "Charged generation cost"
    );
    Ok(())
}

/// Refund one segment's cost for each upstream generation failure.
pub async fn refund_failed_segments(
    ledger: &dyn CreditLedger,
    user_id: &str,
    breakdown: &CostBreakdown,
    failed_indices: &[usize],
) -> WorkerResult<()> {
    for index in failed_indices {
        ledger
            .refund(
                user_id,
                breakdown.per_segment,
                &format!("Segment {} could not be generated", index + 1),
            )
            .await?;
    }
    if !failed_indices.is_empty() {
        info!(
            user_id = %user_id,
            refunded = breakdown.per_segment as usize * failed_indices.len(),
            "Refunded failed segments"
        );
    }
    Ok(())
}

/// Refund exactly the caption portion after a failed caption stage.
///
/// Refund failure is logged and swallowed: the video itself succeeded and
/// a ledger hiccup must not fail the job at this point.
pub async fn refund_caption_addon(
    ledger: &dyn CreditLedger,
    user_id: &str,
    breakdown: &CostBreakdown,
    reason: &str,
) {
    if breakdown.caption_cost == 0 {
        return;
    }
    match ledger
        .refund(
            user_id,
            breakdown.caption_cost,
            &format!("Captions unavailable: {reason}"),
        )
        .await
    {
        Ok(()) => info!(
            user_id = %user_id,
            credits = breakdown.caption_cost,
            "Refunded caption addon"
        ),
        Err(e) => warn!(
            user_id = %user_id,
            error = %e,
            "Failed to refund caption addon"
        ),
    }
}
