//! Seeded synthetic conversation history.
//!
//! Each contact gets a latent warmth in [0, 1]. Reply likelihood, reply speed,
//! sentiment, recency, lead quality and churn all derive from it, so the
//! labels are learnable from the signals the feature extractors read.

use crate::memory::EntitySnapshot;
use crate::records::{ContactRecord, ConversationRecord, Direction, LeadRecord, MessageRecord};
use chrono::{DateTime, Duration, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

const OUTBOUND_BODIES: &[&str] = &[
    "Hi! Just checking in on your order.",
    "We have a new plan that fits your team. Want a quick demo?",
    "Your trial ends soon. Can we help you get set up?",
    "Thanks for reaching out, here is the pricing sheet: https://example.com/pricing",
    "Are you free for a 15 minute call this week?",
    "Reminder: your renewal is coming up next month.",
];

const POSITIVE_REPLIES: &[&str] = &[
    "Sounds great, thanks!",
    "Yes, Thursday works for me.",
    "Love it. Can you send the contract?",
    "Perfect, let's do it.",
];

const NEUTRAL_REPLIES: &[&str] = &["Maybe later.", "What does it cost?", "Ok.", "Not sure yet, will check with my team."];

const NEGATIVE_REPLIES: &[&str] = &[
    "Please stop messaging me.",
    "Unsubscribe",
    "Not interested, remove me from this list.",
    "Too expensive, we are switching providers.",
];

/// Knobs for [`generate`].
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub seed: u64,
    pub contacts: usize,
    /// Reference "now"; all history lies before it.
    pub as_of: DateTime<Utc>,
    /// Share of contacts that also carry a lead.
    pub lead_ratio: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self { seed: 7, contacts: 400, as_of: Utc::now(), lead_ratio: 0.6 }
    }
}

/// Generate a deterministic snapshot for `config`.
pub fn generate(config: &SyntheticConfig) -> EntitySnapshot {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut snapshot = EntitySnapshot::default();
    let mut message_seq = 0usize;

    for i in 0..config.contacts {
        let warmth: f64 = rng.gen_range(0.0..1.0);
        let contact_id = format!("contact-{i:04}");
        let tenure_days = rng.gen_range(30..720);
        let created_at = config.as_of - Duration::days(tenure_days);

        // Cold contacts went quiet a while ago.
        let quiet_days = ((1.0 - warmth) * 90.0 + rng.gen_range(0.0..5.0)).min(tenure_days as f64 - 1.0);
        let last_activity = config.as_of - Duration::minutes((quiet_days * 1440.0) as i64);
        let span_minutes = (tenure_days as f64 - quiet_days).max(1.0) * 1440.0;

        let conversation_count = 1 + (warmth * 3.0) as usize + rng.gen_range(0..2);
        let mut cursor = last_activity - Duration::minutes(rng.gen_range(0.0..span_minutes.min(60.0 * 1440.0)) as i64);

        for c in 0..conversation_count {
            let conversation_id = format!("conv-{i:04}-{c}");
            let started_at = cursor;
            snapshot.conversations.push(ConversationRecord {
                id: conversation_id.clone(),
                contact_id: contact_id.clone(),
                started_at,
            });

            let exchanges = 1 + (warmth * 4.0) as usize + rng.gen_range(0..2);
            let mut at = started_at;
            for _ in 0..exchanges {
                if at > last_activity {
                    break;
                }
                let body = OUTBOUND_BODIES[rng.gen_range(0..OUTBOUND_BODIES.len())];
                let hour_bonus = if (9..=20).contains(&at.hour()) { 0.15 } else { -0.15 };
                let replied = rng.gen_bool((warmth * 0.85 + hour_bonus).clamp(0.02, 0.98));
                let outbound_id = format!("msg-{message_seq:06}");
                message_seq += 1;
                let outbound_index = snapshot.messages.len();
                snapshot.messages.push(MessageRecord {
                    id: outbound_id,
                    conversation_id: conversation_id.clone(),
                    contact_id: contact_id.clone(),
                    direction: Direction::Outbound,
                    body: body.to_string(),
                    sent_at: at,
                    sentiment: None,
                    engaged: Some(false),
                });

                let delay = 5.0 + (1.0 - warmth) * 600.0 + rng.gen_range(0.0..60.0);
                let reply_at = at + Duration::minutes(delay as i64);
                if replied && reply_at <= config.as_of {
                    let sentiment = (2.0 * warmth - 1.0 + rng.gen_range(-0.2..0.2)).clamp(-1.0, 1.0);
                    let pool = if sentiment > 0.3 {
                        POSITIVE_REPLIES
                    } else if sentiment > -0.3 {
                        NEUTRAL_REPLIES
                    } else {
                        NEGATIVE_REPLIES
                    };
                    snapshot.messages.push(MessageRecord {
                        id: format!("msg-{message_seq:06}"),
                        conversation_id: conversation_id.clone(),
                        contact_id: contact_id.clone(),
                        direction: Direction::Inbound,
                        body: pool[rng.gen_range(0..pool.len())].to_string(),
                        sent_at: reply_at,
                        sentiment: Some(sentiment),
                        engaged: None,
                    });
                    message_seq += 1;
                    snapshot.messages[outbound_index].engaged = Some(sentiment > -0.3 && delay < 24.0 * 60.0);
                    at = reply_at;
                }

                at += Duration::minutes(rng.gen_range(60..(3 * 1440)));
            }

            cursor = at + Duration::days(rng.gen_range(1..10));
            if cursor > last_activity {
                cursor = last_activity;
            }
        }

        let churned = warmth + rng.gen_range(-0.08..0.08) < 0.4;
        snapshot.contacts.push(ContactRecord {
            id: contact_id.clone(),
            name: format!("Contact {i}"),
            created_at,
            churned: Some(churned),
        });

        if rng.gen_bool(config.lead_ratio.clamp(0.0, 1.0)) {
            let engagement_score = (warmth * 100.0 + rng.gen_range(-8.0..8.0)).clamp(0.0, 100.0);
            let quality_score = (warmth * 100.0 + rng.gen_range(-6.0..6.0)).clamp(0.0, 100.0);
            snapshot.leads.push(LeadRecord {
                id: format!("lead-{i:04}"),
                contact_id,
                created_at: created_at + Duration::days(1),
                engagement_score: Some(engagement_score),
                quality_score: Some(quality_score),
            });
        }
    }

    info!(
        seed = config.seed,
        contacts = snapshot.contacts.len(),
        messages = snapshot.messages.len(),
        leads = snapshot.leads.len(),
        "Generated synthetic history"
    );
    snapshot
}
