//! Scenario replay: a TOML list of steps applied to a fresh registry.
//!
//! ```toml
//! start_time = 0
//!
//! [[step]]
//! action = "transfer"
//! from = "genesis"
//! to = "alice"
//! amount = 100000
//!
//! [[step]]
//! action = "propose"
//! caller = "alice"
//! name = "DemoListing"
//! deposit = 100
//! ```

use crate::config::TcrConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::path::Path;
use tcr_nullables::NullClock;
use tcr_registry::{ChallengeId, Registry, RegistryError};
use tcr_token::TokenLedger;
use tcr_types::{AccountId, ListingName, Timestamp};
use tcr_utils::format_duration;
use tracing::{debug, info, warn};

/// One user action, or a clock adjustment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Transfer {
        from: AccountId,
        to: AccountId,
        #[serde(with = "tcr_types::amount")]
        amount: u128,
    },
    /// Grant an allowance. The spender defaults to the registry account.
    Approve {
        owner: AccountId,
        #[serde(default)]
        spender: Option<AccountId>,
        #[serde(with = "tcr_types::amount")]
        amount: u128,
    },
    Propose {
        caller: AccountId,
        name: ListingName,
        #[serde(with = "tcr_types::amount")]
        deposit: u128,
        #[serde(default)]
        data: String,
    },
    Challenge {
        caller: AccountId,
        name: ListingName,
        #[serde(with = "tcr_types::amount")]
        deposit: u128,
    },
    Vote {
        caller: AccountId,
        name: ListingName,
        #[serde(with = "tcr_types::amount")]
        amount: u128,
        support: bool,
    },
    Advance {
        secs: u64,
    },
    Resolve {
        caller: AccountId,
        name: ListingName,
    },
    Claim {
        caller: AccountId,
        challenge_id: ChallengeId,
    },
    Exit {
        caller: AccountId,
        name: ListingName,
    },
}

impl Step {
    pub fn action(&self) -> &'static str {
        match self {
            Step::Transfer { .. } => "transfer",
            Step::Approve { .. } => "approve",
            Step::Propose { .. } => "propose",
            Step::Challenge { .. } => "challenge",
            Step::Vote { .. } => "vote",
            Step::Advance { .. } => "advance",
            Step::Resolve { .. } => "resolve",
            Step::Claim { .. } => "claim",
            Step::Exit { .. } => "exit",
        }
    }

    /// Every account this step names, for the closing balance summary.
    fn accounts(&self) -> Vec<&AccountId> {
        match self {
            Step::Transfer { from, to, .. } => vec![from, to],
            Step::Approve { owner, spender, .. } => {
                let mut out = vec![owner];
                out.extend(spender.as_ref());
                out
            }
            Step::Propose { caller, .. }
            | Step::Challenge { caller, .. }
            | Step::Vote { caller, .. }
            | Step::Resolve { caller, .. }
            | Step::Claim { caller, .. }
            | Step::Exit { caller, .. } => vec![caller],
            Step::Advance { .. } => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Scenario {
    /// Simulated clock value before the first step, in seconds.
    #[serde(default)]
    pub start_time: u64,

    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).context("invalid scenario")
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("failed to load scenario file {}", path.display()))
    }
}

/// Outcome of a single step, as printed on stdout.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub action: &'static str,
    pub now: Timestamp,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Ledger events followed by registry events raised by this step.
    pub events: Vec<Value>,
}

/// A registry, its ledger and a simulated clock.
pub struct Simulation {
    registry: Registry,
    clock: NullClock,
    genesis_holder: AccountId,
    start: Timestamp,
}

impl Simulation {
    pub fn new(config: &TcrConfig, start_time: u64) -> anyhow::Result<Self> {
        let genesis_holder = AccountId::new(config.genesis_holder.clone());
        let ledger = TokenLedger::new(config.token.clone(), genesis_holder.clone())
            .context("failed to create token ledger")?;
        let registry = Registry::new(
            config.registry_name.clone(),
            AccountId::new(config.registry_account.clone()),
            config.registry.clone(),
            ledger,
        )
        .context("failed to create registry")?;
        Ok(Self {
            registry,
            clock: NullClock::new(start_time),
            genesis_holder,
            start: Timestamp::new(start_time),
        })
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Apply one step. A failed step leaves the registry and ledger unchanged.
    pub fn apply(&mut self, index: usize, step: &Step) -> StepReport {
        let now = self.clock.now();
        debug!(step = index, action = step.action(), now = now.as_secs(), "applying step");
        let outcome = self.execute(step, now);

        let mut events: Vec<Value> = Vec::new();
        for event in self.registry.ledger_mut().drain_events() {
            events.push(to_value(&event));
        }
        for event in self.registry.drain_events() {
            events.push(to_value(&event));
        }

        match outcome {
            Ok(result) => StepReport {
                step: index,
                action: step.action(),
                now,
                ok: true,
                result: Some(result),
                error_kind: None,
                error: None,
                events,
            },
            Err(e) => {
                warn!(step = index, action = step.action(), kind = ?e.kind(), error = %e, "step failed");
                StepReport {
                    step: index,
                    action: step.action(),
                    now,
                    ok: false,
                    result: None,
                    error_kind: Some(format!("{:?}", e.kind())),
                    error: Some(e.to_string()),
                    events,
                }
            }
        }
    }

    fn execute(&mut self, step: &Step, now: Timestamp) -> Result<Value, RegistryError> {
        let r = &mut self.registry;
        Ok(match step {
            Step::Transfer { from, to, amount } => {
                r.ledger_mut().transfer(from, to, *amount)?;
                Value::Null
            }
            Step::Approve {
                owner,
                spender,
                amount,
            } => {
                let spender = spender.clone().unwrap_or_else(|| r.account().clone());
                r.ledger_mut().approve(owner, &spender, *amount)?;
                Value::Null
            }
            Step::Propose {
                caller,
                name,
                deposit,
                data,
            } => to_value(&r.propose(caller, *name, *deposit, data.as_str(), now)?),
            Step::Challenge {
                caller,
                name,
                deposit,
            } => json!({ "challenge_id": r.challenge(caller, name, *deposit, now)? }),
            Step::Vote {
                caller,
                name,
                amount,
                support,
            } => to_value(&r.vote(caller, name, *amount, *support, now)?),
            Step::Advance { secs } => {
                self.clock.advance(*secs);
                json!({ "now": self.clock.now() })
            }
            Step::Resolve { caller, name } => to_value(&r.resolve(caller, name, now)?),
            Step::Claim {
                caller,
                challenge_id,
            } => json!({ "payout": r.claim_rewards(caller, *challenge_id)? }),
            Step::Exit { caller, name } => json!({ "refunded": r.exit(caller, name)? }),
        })
    }

    /// Balances of the named accounts plus registry custody and listing states.
    pub fn summary<'a>(&self, accounts: impl IntoIterator<Item = &'a AccountId>) -> Value {
        let mut names: BTreeSet<&AccountId> = accounts.into_iter().collect();
        names.insert(&self.genesis_holder);
        names.insert(self.registry.account());

        let ledger = self.registry.ledger();
        let balances: serde_json::Map<String, Value> = names
            .into_iter()
            .map(|a| (a.to_string(), json!(ledger.balance_of(a))))
            .collect();
        let listings: Vec<Value> = self
            .registry
            .listings()
            .iter()
            .filter_map(|name| {
                let details = self.registry.listing_details(name).ok()?;
                Some(json!({ "name": name, "details": details }))
            })
            .collect();

        json!({
            "summary": {
                "registry": self.registry.name(),
                "token": ledger.symbol(),
                "elapsed": format_duration(self.start.elapsed_since(self.clock.now())),
                "custody": self.registry.custody_balance(),
                "supply_conserved": ledger.supply_is_conserved(),
                "balances": balances,
                "listings": listings,
            }
        })
    }
}

/// Replay `scenario` against a fresh registry, handing each report to `sink`.
///
/// Returns the closing summary. Individual step failures do not stop the run.
pub fn run(
    config: &TcrConfig,
    scenario: &Scenario,
    mut sink: impl FnMut(&StepReport),
) -> anyhow::Result<Value> {
    let mut sim = Simulation::new(config, scenario.start_time)?;
    info!(
        registry = %config.registry_name,
        steps = scenario.steps.len(),
        start_time = scenario.start_time,
        "replaying scenario"
    );
    let mut failures = 0usize;
    for (index, step) in scenario.steps.iter().enumerate() {
        let report = sim.apply(index, step);
        if !report.ok {
            failures += 1;
        }
        sink(&report);
    }
    info!(
        steps = scenario.steps.len(),
        failures,
        elapsed = %format_duration(Timestamp::new(scenario.start_time).elapsed_since(sim.now())),
        "scenario complete"
    );
    Ok(sim.summary(scenario.steps.iter().flat_map(Step::accounts)))
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HAPPY_PATH: &str = r#"
        [[step]]
        action = "transfer"
        from = "genesis"
        to = "alice"
        amount = 1000

        [[step]]
        action = "approve"
        owner = "alice"
        amount = 1000

        [[step]]
        action = "propose"
        caller = "alice"
        name = "DemoListing"
        deposit = 100

        [[step]]
        action = "resolve"
        caller = "alice"
        name = "DemoListing"

        [[step]]
        action = "advance"
        secs = 61

        [[step]]
        action = "resolve"
        caller = "bob"
        name = "DemoListing"
    "#;

    fn replay(toml: &str) -> (Vec<StepReport>, Value) {
        let scenario = Scenario::from_toml_str(toml).unwrap();
        let mut reports = Vec::new();
        let summary = run(&TcrConfig::default(), &scenario, |r| reports.push(r.clone())).unwrap();
        (reports, summary)
    }

    #[test]
    fn parses_tagged_steps() {
        let scenario = Scenario::from_toml_str(HAPPY_PATH).unwrap();
        assert_eq!(scenario.steps.len(), 6);
        assert_eq!(
            scenario.steps[1],
            Step::Approve {
                owner: AccountId::new("alice"),
                spender: None,
                amount: 1000
            }
        );
        assert_eq!(scenario.steps[4], Step::Advance { secs: 61 });
    }

    #[test]
    fn challenge_demo_replays_to_completion() {
        let (reports, summary) = replay(include_str!("../../demos/challenge.toml"));
        assert_eq!(reports.len(), 18);

        let failed: Vec<usize> = reports.iter().filter(|r| !r.ok).map(|r| r.step).collect();
        assert_eq!(failed, vec![12, 16]);
        assert_eq!(reports[12].error_kind.as_deref(), Some("StateConflict"));
        assert_eq!(reports[16].error_kind.as_deref(), Some("StateConflict"));

        assert_eq!(reports[15].result, Some(json!({ "payout": 160 })));
        assert_eq!(reports[17].result, Some(json!({ "refunded": 100 })));

        let s = &summary["summary"];
        assert_eq!(s["balances"]["carol"], 1100);
        assert_eq!(s["balances"]["dave"], 960);
        assert_eq!(s["balances"]["alice"], 100_000);
        assert_eq!(s["balances"]["bob"], 99_900);
        // Dave's losing votes stay with the registry.
        assert_eq!(s["custody"], 40);
        assert_eq!(s["supply_conserved"], true);
    }

    #[test]
    fn amounts_beyond_i64_parse_from_strings() {
        let scenario = Scenario::from_toml_str(
            "[[step]]\naction = \"vote\"\ncaller = \"a\"\nname = \"x\"\namount = \"1_000_000_000_000_000_000_000\"\nsupport = true\n",
        )
        .unwrap();
        assert!(matches!(
            scenario.steps[0],
            Step::Vote { amount, .. } if amount == 10u128.pow(21)
        ));
    }

    #[test]
    fn over_long_listing_name_fails_to_parse() {
        let toml = format!(
            "[[step]]\naction = \"exit\"\ncaller = \"a\"\nname = \"{}\"\n",
            "n".repeat(33)
        );
        assert!(Scenario::from_toml_str(&toml).is_err());
    }

    #[test]
    fn happy_path_whitelists_after_period() {
        let (reports, summary) = replay(HAPPY_PATH);
        assert!(reports[0].ok && reports[1].ok && reports[2].ok);

        // Early resolve is rejected but the run continues.
        assert!(!reports[3].ok);
        assert_eq!(reports[3].error_kind.as_deref(), Some("StateConflict"));
        assert!(reports[3].events.is_empty());

        assert!(reports[5].ok);
        assert_eq!(reports[5].events[0]["event"], "ListingWhitelisted");
        assert_eq!(reports[5].events[0]["name"], "DemoListing");

        let s = &summary["summary"];
        assert_eq!(s["custody"], 100);
        assert_eq!(s["balances"]["alice"], 900);
        assert_eq!(s["supply_conserved"], true);
        assert_eq!(s["listings"][0]["name"], "DemoListing");
        assert_eq!(s["listings"][0]["details"]["status"], "Whitelisted");
    }

    #[test]
    fn propose_reports_ledger_and_registry_events() {
        let (reports, _) = replay(HAPPY_PATH);
        let events = &reports[2].events;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"], "Transfer");
        assert_eq!(events[1]["event"], "Application");
    }

    #[test]
    fn validation_failures_are_reported_by_kind() {
        let (reports, _) = replay(
            r#"
            [[step]]
            action = "propose"
            caller = "alice"
            name = "Cheap"
            deposit = 1
            "#,
        );
        assert!(!reports[0].ok);
        assert_eq!(reports[0].error_kind.as_deref(), Some("Validation"));
    }

    #[test]
    fn start_time_seeds_the_clock() {
        let scenario = Scenario::from_toml_str("start_time = 500\n[[step]]\naction = \"advance\"\nsecs = 10\n").unwrap();
        let mut reports = Vec::new();
        let summary = run(&TcrConfig::default(), &scenario, |r| reports.push(r.clone())).unwrap();
        assert_eq!(reports[0].now, Timestamp::new(500));
        assert_eq!(reports[0].result, Some(json!({ "now": 510 })));
        assert_eq!(summary["summary"]["elapsed"], "10s");
    }
}
