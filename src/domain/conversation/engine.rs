//! Confirmation engine.
//!
//! Pure transition logic for the multi-turn flow. Given the topic's pending
//! action and the new input, it decides what to reply and what the topic
//! should wait for next. Anything that needs storage (running a confirmed
//! action, re-reading a chosen product) is handed back to the caller as a
//! decision instead of being performed here.

use crate::domain::catalog::{Product, ProductCandidate, MAX_PRICE, MAX_STOCK_QUANTITY};

use super::extractor::extract_product_fields;
use super::intent::{is_affirmation, is_cancellation, is_rejection, numeric_selection};
use super::pending::{
    CandidateRef, ConfirmableAction, PendingAction, ProductChoice, RestockOrder,
};
use super::replies;

/// Outcome of feeding one input to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineDecision {
    /// Send `reply` and leave the topic waiting for `next`.
    Reply { reply: String, next: PendingAction },
    /// The user affirmed; run the action and return to idle.
    Execute(ConfirmableAction),
    /// The user picked a candidate; re-read it, then call
    /// [`ConfirmationEngine::confirm_selection`].
    Select { candidate: CandidateRef, quantity: i64 },
}

impl EngineDecision {
    fn reply(reply: impl Into<String>, next: PendingAction) -> Self {
        Self::Reply {
            reply: reply.into(),
            next,
        }
    }
}

/// Transition rules of the confirmation state machine.
pub struct ConfirmationEngine;

impl ConfirmationEngine {
    /// Interprets `input` against a pending action.
    ///
    /// Returns `None` when the topic is idle, meaning the input is a fresh
    /// command.
    pub fn decide(pending: &PendingAction, input: &str) -> Option<EngineDecision> {
        match pending {
            PendingAction::Idle => None,
            PendingAction::AwaitingChoice(choice) => Some(Self::decide_choice(pending, choice, input)),
            PendingAction::AwaitingConfirm(action) => {
                Some(Self::decide_confirmation(pending, action, input))
            }
        }
    }

    fn decide_choice(pending: &PendingAction, choice: &ProductChoice, input: &str) -> EngineDecision {
        if let Some(number) = numeric_selection(input) {
            return match choice.select(number) {
                Some(candidate) => EngineDecision::Select {
                    candidate: candidate.clone(),
                    quantity: choice.quantity,
                },
                None => EngineDecision::reply(
                    replies::invalid_selection(choice.candidates.len()),
                    pending.clone(),
                ),
            };
        }

        if is_cancellation(input) {
            return EngineDecision::reply(replies::SELECTION_CANCELED, PendingAction::Idle);
        }

        EngineDecision::reply(replies::CHOICE_REMINDER, pending.clone())
    }

    fn decide_confirmation(
        pending: &PendingAction,
        action: &ConfirmableAction,
        input: &str,
    ) -> EngineDecision {
        if is_affirmation(input) {
            EngineDecision::Execute(action.clone())
        } else if is_rejection(input) || is_cancellation(input) {
            EngineDecision::reply(replies::ACTION_CANCELED, PendingAction::Idle)
        } else {
            EngineDecision::reply(replies::CONFIRM_REMINDER, pending.clone())
        }
    }

    /// Extracts product fields and asks the user to confirm them.
    ///
    /// A price or stock above the catalog limits is refused up front.
    pub fn propose_add_product(text: &str) -> EngineDecision {
        let draft = extract_product_fields(text);
        if draft.price > MAX_PRICE || draft.initial_stock > MAX_STOCK_QUANTITY {
            return EngineDecision::reply(
                replies::product_values_too_large(MAX_PRICE, MAX_STOCK_QUANTITY),
                PendingAction::Idle,
            );
        }
        let reply = replies::add_product_prompt(&draft);
        EngineDecision::reply(
            reply,
            PendingAction::AwaitingConfirm(ConfirmableAction::AddProduct(draft)),
        )
    }

    /// Chooses the next step for a restock once candidates are known.
    ///
    /// No candidate stays idle, one candidate goes straight to confirmation,
    /// several ask the user to pick. A quantity above
    /// [`MAX_STOCK_QUANTITY`] is refused before looking at candidates.
    pub fn propose_restock(
        query: &str,
        quantity: i64,
        candidates: &[ProductCandidate],
    ) -> EngineDecision {
        if quantity > MAX_STOCK_QUANTITY {
            return EngineDecision::reply(
                replies::amount_too_large(MAX_STOCK_QUANTITY),
                PendingAction::Idle,
            );
        }

        match candidates {
            [] => EngineDecision::reply(replies::product_not_found(query), PendingAction::Idle),
            [only] => EngineDecision::reply(
                replies::restock_prompt(&only.product.name, quantity),
                PendingAction::AwaitingConfirm(ConfirmableAction::Restock(RestockOrder {
                    product_id: only.product.id,
                    quantity,
                })),
            ),
            many => EngineDecision::reply(
                replies::choose_product_prompt(query, many),
                PendingAction::AwaitingChoice(ProductChoice {
                    quantity,
                    candidates: many
                        .iter()
                        .map(|c| CandidateRef {
                            id: c.product.id,
                            name: c.product.name.clone(),
                        })
                        .collect(),
                }),
            ),
        }
    }

    /// Promotes a picked candidate to a restock confirmation.
    ///
    /// `selected` is the freshly re-read product; `None` means it vanished
    /// since the list was shown, which abandons the flow.
    pub fn confirm_selection(selected: Option<&Product>, quantity: i64) -> EngineDecision {
        match selected {
            Some(product) => EngineDecision::reply(
                replies::selection_confirmed(&product.name, quantity),
                PendingAction::AwaitingConfirm(ConfirmableAction::Restock(RestockOrder {
                    product_id: product.id,
                    quantity,
                })),
            ),
            None => EngineDecision::reply(replies::SELECTED_PRODUCT_GONE, PendingAction::Idle),
        }
    }
}
