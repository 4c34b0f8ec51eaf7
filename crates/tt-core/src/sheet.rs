//! Randomized test-sheet planning.
//!
//! A sheet assigns every group three blinding codes, one per serving
//! position, following the group's fixed serving order. The correct answer
//! for a group is the code on its odd sample. Codes are unique across the
//! whole sheet so a stray answer can never match another group's sample.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;
use tt_common::{Error, GroupLabel, Product, Result, TestSessionId};

/// Codes a sheet needs: six groups times three samples.
const CODES_PER_SHEET: usize = 18;

/// One coded cup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// 1-based serving position.
    pub position: usize,
    pub code: String,
    pub product: Product,
}

/// Serving plan for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetGroup {
    pub group: GroupLabel,
    pub samples: Vec<Sample>,
    /// Code of the odd sample.
    pub correct_answer: String,
    /// Text encoded into the group's QR code.
    pub qr_payload: String,
}

/// A complete test sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetPlan {
    pub session_id: TestSessionId,
    /// Seed that reproduces this sheet.
    pub seed: u64,
    pub code_digits: u32,
    pub groups: Vec<SheetGroup>,
}

impl SheetPlan {
    pub fn group(&self, label: GroupLabel) -> Option<&SheetGroup> {
        self.groups.iter().find(|g| g.group == label)
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::with_capacity(1024);
        md.push_str(&format!("# Test Sheet {}\n\n", self.session_id));
        md.push_str(&format!("Seed: `{}`\n\n", self.seed));
        md.push_str("| Group | Position 1 | Position 2 | Position 3 | Odd sample | QR payload |\n");
        md.push_str("|-------|------------|------------|------------|------------|------------|\n");
        for group in &self.groups {
            let cells: Vec<String> = group
                .samples
                .iter()
                .map(|s| format!("{} ({})", s.code, s.product))
                .collect();
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                group.group,
                cells.join(" | "),
                group.correct_answer,
                group.qr_payload
            ));
        }
        md
    }
}

/// QR payload for a group: `<session>|<group>`.
pub fn qr_payload(session: &TestSessionId, group: GroupLabel) -> String {
    format!("{}|{}", session, group)
}

/// Plan a sheet. Without a seed one is drawn and recorded in the plan.
pub fn plan_sheet(
    session: TestSessionId,
    seed: Option<u64>,
    code_digits: u32,
) -> Result<SheetPlan> {
    if !(2..=6).contains(&code_digits) {
        return Err(Error::InvalidConfig(format!(
            "code_digits must be between 2 and 6, got {}",
            code_digits
        )));
    }

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    let codes = draw_codes(&mut rng, code_digits, CODES_PER_SHEET);

    let groups = GroupLabel::ALL
        .iter()
        .zip(codes.chunks(3))
        .map(|(&group, chunk)| {
            let order = group.serving_order();
            let samples: Vec<Sample> = order
                .iter()
                .zip(chunk)
                .enumerate()
                .map(|(i, (&product, code))| Sample {
                    position: i + 1,
                    code: code.clone(),
                    product,
                })
                .collect();
            SheetGroup {
                group,
                correct_answer: samples[group.odd_position()].code.clone(),
                samples,
                qr_payload: qr_payload(&session, group),
            }
        })
        .collect();

    debug!(session = %session, seed, code_digits, "Planned test sheet");

    Ok(SheetPlan {
        session_id: session,
        seed,
        code_digits,
        groups,
    })
}

/// Distinct codes without a leading zero.
fn draw_codes(rng: &mut StdRng, digits: u32, count: usize) -> Vec<String> {
    let low = 10u32.pow(digits - 1);
    let high = 10u32.pow(digits);
    let mut seen = HashSet::with_capacity(count);
    let mut codes = Vec::with_capacity(count);
    while codes.len() < count {
        let code = rng.random_range(low..high);
        if seen.insert(code) {
            codes.push(code.to_string());
        }
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(seed: u64) -> SheetPlan {
        plan_sheet(TestSessionId::from("s1"), Some(seed), 3).unwrap()
    }

    #[test]
    fn same_seed_same_sheet() {
        assert_eq!(plan(42), plan(42));
        assert_ne!(plan(42).groups, plan(43).groups);
    }

    #[test]
    fn codes_are_unique_and_three_digits() {
        let sheet = plan(7);
        let codes: Vec<&str> = sheet
            .groups
            .iter()
            .flat_map(|g| g.samples.iter().map(|s| s.code.as_str()))
            .collect();
        assert_eq!(codes.len(), 18);
        let unique: HashSet<&str> = codes.iter().copied().collect();
        assert_eq!(unique.len(), 18);
        assert!(codes.iter().all(|c| c.len() == 3 && !c.starts_with('0')));
    }

    #[test]
    fn groups_follow_serving_orders() {
        let sheet = plan(11);
        let labels: Vec<GroupLabel> = sheet.groups.iter().map(|g| g.group).collect();
        assert_eq!(labels, GroupLabel::ALL.to_vec());
        for group in &sheet.groups {
            let products: Vec<Product> = group.samples.iter().map(|s| s.product).collect();
            assert_eq!(products, group.group.serving_order().to_vec());
        }
    }

    #[test]
    fn correct_answer_is_the_odd_sample() {
        let sheet = plan(3);
        for group in &sheet.groups {
            let odd: Vec<&Sample> = group
                .samples
                .iter()
                .filter(|s| {
                    group.samples.iter().filter(|o| o.product == s.product).count() == 1
                })
                .collect();
            assert_eq!(odd.len(), 1);
            assert_eq!(odd[0].code, group.correct_answer);
        }
        assert_eq!(sheet.group(GroupLabel::B2).unwrap().qr_payload, "s1|B2");
    }

    #[test]
    fn unseeded_sheet_records_its_seed() {
        let sheet = plan_sheet(TestSessionId::from("s1"), None, 3).unwrap();
        let again = plan_sheet(TestSessionId::from("s1"), Some(sheet.seed), 3).unwrap();
        assert_eq!(sheet, again);
    }

    #[test]
    fn code_digits_are_bounded() {
        assert!(plan_sheet(TestSessionId::from("s1"), Some(1), 1).is_err());
        let two = plan_sheet(TestSessionId::from("s1"), Some(1), 2).unwrap();
        assert!(two.groups[0].samples[0].code.len() == 2);
    }

    #[test]
    fn markdown_lists_every_group() {
        let md = plan(5).to_markdown();
        assert!(md.starts_with("# Test Sheet s1"));
        for label in GroupLabel::ALL {
            assert!(md.contains(&format!("| {} |", label)));
        }
    }
}
