//! Turns pasted recipient text into a validated [`RecipientList`].
//!
//! Lines are trimmed and blank lines skipped. Tokens on a line are separated by any run of
//! whitespace and/or commas, so `0xabc.. 1.5`, `0xabc..,1.5` and `0xabc..\t1.5` are equivalent.
//! Parsing is all-or-nothing: the first bad line aborts and nothing is returned for the lines
//! before it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use disperse_types::{units, Address, U256};

use crate::{
    distribution::{RecipientEntry, RecipientList},
    error::{EntryError, Error, Result},
};

/// How amounts are supplied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Each line carries its own amount: `address amount`.
    List,
    /// Each line carries only an address; everyone receives the same global amount.
    Global,
}

impl Default for InputMode {
    fn default() -> Self {
        InputMode::List
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}

fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(is_separator).filter(|token| !token.is_empty())
}

/// Non-blank trimmed lines with their 1-based line numbers.
fn lines(raw_text: &str) -> impl Iterator<Item = (usize, &str)> {
    raw_text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

fn address(line: usize, token: &str) -> Result<Address> {
    Address::from_str(token).map_err(|reason| Error::InvalidEntry {
        line,
        detail: EntryError::InvalidAddress {
            token: token.to_string(),
            reason,
        },
    })
}

/// Parses `raw_text` into recipients with amounts converted at `unit_count`.
///
/// In [`InputMode::Global`] the `global_amount` is converted before any line is looked at, and a
/// missing or malformed global amount fails with [`Error::MalformedAmount`]. In
/// [`InputMode::List`] the `global_amount` is ignored.
pub fn parse(
    raw_text: &str,
    mode: InputMode,
    unit_count: u8,
    global_amount: Option<&str>,
) -> Result<RecipientList> {
    let entries = match mode {
        InputMode::List => parse_list(raw_text, unit_count)?,
        InputMode::Global => {
            let amount = global_amount.unwrap_or_default().trim();
            let base_units =
                units::to_base_units(amount, unit_count).map_err(|reason| {
                    Error::MalformedAmount {
                        amount: amount.to_string(),
                        reason,
                    }
                })?;
            parse_global(raw_text, amount, base_units)?
        }
    };

    if entries.is_empty() {
        return Err(Error::NoValidEntries);
    }
    Ok(RecipientList::new(entries, unit_count))
}

fn parse_list(raw_text: &str, unit_count: u8) -> Result<Vec<RecipientEntry>> {
    let mut entries = Vec::new();
    for (line, text) in lines(raw_text) {
        let mut parts = tokens(text);
        // A line of bare separators has no tokens and fails address validation.
        let address_token = parts.next().unwrap_or_default();
        let address = address(line, address_token)?;

        let amount = parts.next().ok_or_else(|| Error::InvalidEntry {
            line,
            detail: EntryError::MissingAmount {
                address: address_token.to_string(),
            },
        })?;
        let base_units =
            units::to_base_units(amount, unit_count).map_err(|reason| Error::InvalidEntry {
                line,
                detail: EntryError::InvalidAmount {
                    address: address_token.to_string(),
                    amount: amount.to_string(),
                    reason,
                },
            })?;

        entries.push(RecipientEntry {
            address,
            display_amount: amount.to_string(),
            base_units,
        });
    }
    Ok(entries)
}

fn parse_global(raw_text: &str, amount: &str, base_units: U256) -> Result<Vec<RecipientEntry>> {
    lines(raw_text)
        .map(|(line, text)| {
            let address_token = tokens(text).next().unwrap_or_default();
            Ok(RecipientEntry {
                address: address(line, address_token)?,
                display_amount: amount.to_string(),
                base_units,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use disperse_types::{AddressParseError, AmountParseError};

    use super::*;
    use crate::distribution::total;

    const ALICE: &str = "0x1111111111111111111111111111111111111111";
    const BOB: &str = "0x2222222222222222222222222222222222222222";
    const CAROL: &str = "0x3333333333333333333333333333333333333333";

    fn wei(ether: u64) -> U256 {
        U256::from(ether) * U256::exp10(18)
    }

    #[test]
    fn should_parse_list_mode() {
        let input = format!("{}, 1.0\n{}, 2.0", ALICE, BOB);
        let list = parse(&input, InputMode::List, 18, None).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.unit_count(), 18);
        assert_eq!(list.entries()[0].address, Address::from_str(ALICE).unwrap());
        assert_eq!(list.entries()[0].display_amount, "1.0");
        assert_eq!(list.entries()[1].base_units, wei(2));
        assert_eq!(total(&list).unwrap(), wei(3));
    }

    #[test]
    fn should_accept_mixed_separators_and_ignore_extra_tokens() {
        let input = format!(
            "  {} 1\n\n{}\t,\t2 trailing note\n{},3,extra\n   \n",
            ALICE, BOB, CAROL
        );
        let list = parse(&input, InputMode::List, 0, None).unwrap();
        assert_eq!(list.amounts(), vec![U256::from(1u64), U256::from(2u64), U256::from(3u64)]);
    }

    #[test]
    fn should_abort_whole_list_on_invalid_address() {
        let input = format!("{} 1\n0xnot-an-address 2\n{} 3", ALICE, CAROL);
        let error = parse(&input, InputMode::List, 18, None).unwrap_err();
        assert_eq!(
            error,
            Error::InvalidEntry {
                line: 2,
                detail: EntryError::InvalidAddress {
                    token: "0xnot-an-address".to_string(),
                    reason: AddressParseError::InvalidLength(14),
                },
            }
        );
    }

    #[test]
    fn should_abort_whole_list_on_invalid_amount() {
        let input = format!("{} 1\n{} 2\n\n{} 1.5.5", ALICE, BOB, CAROL);
        let error = parse(&input, InputMode::List, 18, None).unwrap_err();
        assert_eq!(
            error,
            Error::InvalidEntry {
                line: 4,
                detail: EntryError::InvalidAmount {
                    address: CAROL.to_string(),
                    amount: "1.5.5".to_string(),
                    reason: AmountParseError::MultipleDecimalPoints,
                },
            }
        );
    }

    #[test]
    fn should_reject_amount_finer_than_unit_count() {
        let input = format!("{} 0.1234567", ALICE);
        let error = parse(&input, InputMode::List, 6, None).unwrap_err();
        assert!(matches!(
            error,
            Error::InvalidEntry {
                line: 1,
                detail: EntryError::InvalidAmount { .. }
            }
        ));
    }

    #[test]
    fn should_require_amount_in_list_mode() {
        let input = format!("{} 1\n{}", ALICE, BOB);
        let error = parse(&input, InputMode::List, 18, None).unwrap_err();
        assert_eq!(
            error,
            Error::InvalidEntry {
                line: 2,
                detail: EntryError::MissingAmount {
                    address: BOB.to_string()
                },
            }
        );
    }

    #[test]
    fn should_parse_global_mode() {
        let input = format!("{}\n{}\n{}", ALICE, BOB, CAROL);
        let list = parse(&input, InputMode::Global, 6, Some("5")).unwrap();

        assert_eq!(list.len(), 3);
        for entry in list.entries() {
            assert_eq!(entry.base_units, U256::from(5_000_000u64));
            assert_eq!(entry.display_amount, "5");
        }
        assert_eq!(total(&list).unwrap(), U256::from(15_000_000u64));
    }

    #[test]
    fn should_take_first_token_in_global_mode() {
        let input = format!("{}, {}\n{} 99", ALICE, BOB, CAROL);
        let list = parse(&input, InputMode::Global, 0, Some("1")).unwrap();
        assert_eq!(
            list.receivers(),
            vec![
                Address::from_str(ALICE).unwrap(),
                Address::from_str(CAROL).unwrap()
            ]
        );
    }

    #[test]
    fn should_check_global_amount_before_lines() {
        // The lines are invalid too, but the amount is reported.
        let error = parse("garbage\nmore garbage", InputMode::Global, 18, Some("abc")).unwrap_err();
        assert_eq!(
            error,
            Error::MalformedAmount {
                amount: "abc".to_string(),
                reason: AmountParseError::InvalidCharacter('a'),
            }
        );

        let error = parse(ALICE, InputMode::Global, 18, None).unwrap_err();
        assert_eq!(
            error,
            Error::MalformedAmount {
                amount: String::new(),
                reason: AmountParseError::Empty,
            }
        );
    }

    #[test]
    fn should_abort_global_mode_on_invalid_address() {
        let input = format!("{}\n{}\nbogus", ALICE, BOB);
        let error = parse(&input, InputMode::Global, 18, Some("1")).unwrap_err();
        assert!(matches!(
            error,
            Error::InvalidEntry {
                line: 3,
                detail: EntryError::InvalidAddress { .. }
            }
        ));
    }

    #[test]
    fn should_report_no_entries_for_blank_input() {
        assert_eq!(
            parse("  \n\n\t\n", InputMode::List, 18, None),
            Err(Error::NoValidEntries)
        );
        assert_eq!(
            parse("", InputMode::Global, 18, Some("1")),
            Err(Error::NoValidEntries)
        );
    }

    proptest::proptest! {
        #[test]
        fn list_total_is_sum_of_lines(
            lines in proptest::collection::vec((proptest::prelude::any::<[u8; 20]>(), 0u64..1_000_000), 1..20),
            separator in proptest::sample::select(vec![" ", ",", ", ", "\t", " , "]),
        ) {
            let text = lines
                .iter()
                .map(|(address, amount)| format!("0x{}{}{}", hex::encode(address), separator, amount))
                .collect::<Vec<_>>()
                .join("\n");
            let list = parse(&text, InputMode::List, 6, None).unwrap();

            let expected = lines
                .iter()
                .fold(U256::zero(), |sum, (_, amount)| sum + U256::from(*amount) * U256::exp10(6));
            proptest::prop_assert_eq!(list.len(), lines.len());
            proptest::prop_assert_eq!(total(&list).unwrap(), expected);
            proptest::prop_assert_eq!(list.entries()[0].address.as_bytes(), &lines[0].0);
        }
    }
}
