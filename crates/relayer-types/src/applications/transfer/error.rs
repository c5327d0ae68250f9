use core::num::ParseIntError;

use flex_error::{define_error, TraceError};

define_error! {
    Error {
        InvalidAmount
            { amount: String }
            [ TraceError<ParseIntError> ]
            | e | { format_args!("invalid amount `{0}`", e.amount) },

        InvalidCoin
            { coin: String }
            | e | { format_args!("invalid coin `{0}`, expected `{{amount}}{{denom}}`, eg. `100stake`", e.coin) },

        EmptyBaseDenom
            | _ | { "base denomination is empty" },

        InvalidDenom
            { denom: String }
            | e | { format_args!("invalid denomination `{0}`", e.denom) },

        EncodePacketData
            [ TraceError<serde_json::Error> ]
            | _ | { "failed to encode the fungible token packet data" },
    }
}
