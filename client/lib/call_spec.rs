//! Contract calls issued by a distribution, and their ABI encoding.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use disperse_types::{Address, U256};

use crate::{asset::AssetKind, distribution::RecipientList};

const APPROVE: &str = "approve(address,uint256)";
const DISTRIBUTE_NATIVE: &str = "distributeETH(address[],uint256[])";
const DISTRIBUTE_TOKEN: &str = "distributeERC20(address,address[],uint256[])";

/// A contract call, described independently of how it is signed or sent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "function")]
pub enum CallSpec {
    /// Token `approve`, letting `spender` pull `amount` from the caller.
    Approve {
        /// The token contract.
        token: Address,
        /// The distributor contract.
        spender: Address,
        /// Exactly the distribution total.
        amount: U256,
    },
    /// Distributor `distributeETH`, paid for with the attached value.
    DistributeNative {
        /// The distributor contract.
        contract: Address,
        /// Receiving addresses.
        receivers: Vec<Address>,
        /// Amounts in base units, aligned with `receivers`.
        amounts: Vec<U256>,
        /// Value attached to the call, the sum of `amounts`.
        value: U256,
    },
    /// Distributor `distributeERC20`, pulling tokens under the caller's allowance.
    DistributeToken {
        /// The distributor contract.
        contract: Address,
        /// The token contract.
        token: Address,
        /// Receiving addresses.
        receivers: Vec<Address>,
        /// Amounts in base units, aligned with `receivers`.
        amounts: Vec<U256>,
    },
}

impl CallSpec {
    /// Builds the authorization call for a token distribution totalling `total`.
    pub fn approve(token: Address, spender: Address, total: U256) -> Self {
        CallSpec::Approve {
            token,
            spender,
            amount: total,
        }
    }

    /// Builds the distribution call for `recipients` of `asset`.
    pub fn distribution(
        contract: Address,
        asset: AssetKind,
        recipients: &RecipientList,
        total: U256,
    ) -> Self {
        match asset {
            AssetKind::Native => CallSpec::DistributeNative {
                contract,
                receivers: recipients.receivers(),
                amounts: recipients.amounts(),
                value: total,
            },
            AssetKind::Fungible(token) => CallSpec::DistributeToken {
                contract,
                token,
                receivers: recipients.receivers(),
                amounts: recipients.amounts(),
            },
        }
    }

    /// The contract the call is sent to.
    pub fn target(&self) -> Address {
        match self {
            CallSpec::Approve { token, .. } => *token,
            CallSpec::DistributeNative { contract, .. }
            | CallSpec::DistributeToken { contract, .. } => *contract,
        }
    }

    /// Native value attached to the call.
    pub fn value(&self) -> U256 {
        match self {
            CallSpec::DistributeNative { value, .. } => *value,
            CallSpec::Approve { .. } | CallSpec::DistributeToken { .. } => U256::zero(),
        }
    }

    /// Canonical signature of the called function.
    pub fn function_signature(&self) -> &'static str {
        match self {
            CallSpec::Approve { .. } => APPROVE,
            CallSpec::DistributeNative { .. } => DISTRIBUTE_NATIVE,
            CallSpec::DistributeToken { .. } => DISTRIBUTE_TOKEN,
        }
    }

    /// The 4-byte function selector.
    pub fn selector(&self) -> [u8; 4] {
        abi::selector(self.function_signature())
    }

    /// ABI-encoded call data: selector followed by the encoded arguments.
    pub fn calldata(&self) -> Vec<u8> {
        let mut encoder = abi::Encoder::default();
        match self {
            CallSpec::Approve {
                spender, amount, ..
            } => {
                encoder.address(spender);
                encoder.uint(amount);
            }
            CallSpec::DistributeNative {
                receivers, amounts, ..
            } => {
                encoder.address_array(receivers);
                encoder.uint_array(amounts);
            }
            CallSpec::DistributeToken {
                token,
                receivers,
                amounts,
                ..
            } => {
                encoder.address(token);
                encoder.address_array(receivers);
                encoder.uint_array(amounts);
            }
        }

        let mut calldata = self.selector().to_vec();
        calldata.extend(encoder.finish());
        calldata
    }
}

impl Display for CallSpec {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match self {
            CallSpec::Approve {
                token,
                spender,
                amount,
            } => write!(formatter, "approve {} of {} for {}", amount, token, spender),
            CallSpec::DistributeNative {
                receivers, value, ..
            } => write!(
                formatter,
                "distribute {} native to {} receivers",
                value,
                receivers.len()
            ),
            CallSpec::DistributeToken {
                token, receivers, ..
            } => write!(
                formatter,
                "distribute {} to {} receivers",
                token,
                receivers.len()
            ),
        }
    }
}

/// Minimal encoder for the static and dynamic-array argument types the distributor uses.
mod abi {
    use disperse_types::{crypto, Address, U256};

    const WORD: usize = 32;

    pub(super) fn selector(signature: &str) -> [u8; 4] {
        let hash = crypto::keccak256(signature.as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    fn address_word(address: &Address) -> [u8; WORD] {
        let mut word = [0u8; WORD];
        word[WORD - address.as_bytes().len()..].copy_from_slice(address.as_bytes());
        word
    }

    fn uint_word(value: &U256) -> [u8; WORD] {
        let mut word = [0u8; WORD];
        value.to_big_endian(&mut word);
        word
    }

    enum Argument {
        Static([u8; WORD]),
        Dynamic(Vec<[u8; WORD]>),
    }

    /// Collects arguments in order; `finish` lays them out as head words followed by tails.
    #[derive(Default)]
    pub(super) struct Encoder {
        arguments: Vec<Argument>,
    }

    impl Encoder {
        pub(super) fn address(&mut self, address: &Address) {
            self.arguments.push(Argument::Static(address_word(address)));
        }

        pub(super) fn uint(&mut self, value: &U256) {
            self.arguments.push(Argument::Static(uint_word(value)));
        }

        pub(super) fn address_array(&mut self, addresses: &[Address]) {
            self.array(addresses.iter().map(address_word).collect());
        }

        pub(super) fn uint_array(&mut self, values: &[U256]) {
            self.array(values.iter().map(uint_word).collect());
        }

        fn array(&mut self, elements: Vec<[u8; WORD]>) {
            let mut words = Vec::with_capacity(elements.len() + 1);
            words.push(uint_word(&U256::from(elements.len())));
            words.extend(elements);
            self.arguments.push(Argument::Dynamic(words));
        }

        pub(super) fn finish(self) -> Vec<u8> {
            let mut head = Vec::new();
            let mut tail: Vec<u8> = Vec::new();
            let head_length = self.arguments.len() * WORD;
            for argument in self.arguments {
                match argument {
                    Argument::Static(word) => head.extend_from_slice(&word),
                    Argument::Dynamic(words) => {
                        head.extend_from_slice(&uint_word(&U256::from(head_length + tail.len())));
                        for word in words {
                            tail.extend_from_slice(&word);
                        }
                    }
                }
            }
            head.extend(tail);
            head
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use disperse_types::crypto;

    use super::*;
    use crate::parsing::{self, InputMode};

    const TOKEN: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
    const CONTRACT: &str = "0x110769e12155d2d1875d42dcf66d7d92aca1e207";

    fn word(value: u64) -> String {
        format!("{:064x}", value)
    }

    fn padded(address: &str) -> String {
        format!("{:0>64}", &address[2..])
    }

    #[test]
    fn should_use_standard_approve_selector() {
        let call = CallSpec::approve(
            Address::from_str(TOKEN).unwrap(),
            Address::from_str(CONTRACT).unwrap(),
            U256::from(1_000u64),
        );
        assert_eq!(hex::encode(call.selector()), "095ea7b3");
        assert_eq!(
            hex::encode(call.calldata()),
            format!("095ea7b3{}{}", padded(CONTRACT), word(1_000))
        );
        assert_eq!(call.target(), Address::from_str(TOKEN).unwrap());
        assert_eq!(call.value(), U256::zero());
    }

    #[test]
    fn should_encode_native_distribution() {
        let input = "0x1111111111111111111111111111111111111111 1\n\
                     0x2222222222222222222222222222222222222222 2";
        let list = parsing::parse(input, InputMode::List, 0, None).unwrap();
        let call = CallSpec::distribution(
            Address::from_str(CONTRACT).unwrap(),
            AssetKind::Native,
            &list,
            U256::from(3u64),
        );

        assert_eq!(call.value(), U256::from(3u64));
        assert_eq!(call.target(), Address::from_str(CONTRACT).unwrap());

        let encoded = hex::encode(&call.calldata()[4..]);
        let expected = [
            word(0x40),
            word(0xa0),
            word(2),
            padded("0x1111111111111111111111111111111111111111"),
            padded("0x2222222222222222222222222222222222222222"),
            word(2),
            word(1),
            word(2),
        ]
        .concat();
        assert_eq!(encoded, expected);
    }

    #[test]
    fn should_encode_token_distribution() {
        let input = "0x1111111111111111111111111111111111111111 5";
        let list = parsing::parse(input, InputMode::List, 0, None).unwrap();
        let token = Address::from_str(TOKEN).unwrap();
        let call = CallSpec::distribution(
            Address::from_str(CONTRACT).unwrap(),
            AssetKind::Fungible(token),
            &list,
            U256::from(5u64),
        );

        assert_eq!(call.value(), U256::zero());
        assert_eq!(call.function_signature(), DISTRIBUTE_TOKEN);

        let encoded = hex::encode(&call.calldata()[4..]);
        let expected = [
            padded(TOKEN),
            word(0x60),
            word(0xa0),
            word(1),
            padded("0x1111111111111111111111111111111111111111"),
            word(1),
            word(5),
        ]
        .concat();
        assert_eq!(encoded, expected);
    }

    #[test]
    fn should_derive_selector_from_keccak() {
        let hash = crypto::keccak256(DISTRIBUTE_NATIVE.as_bytes());
        assert_eq!(abi::selector(DISTRIBUTE_NATIVE), [hash[0], hash[1], hash[2], hash[3]]);
    }
}
