use flex_error::{define_error, TraceError};

use packet_relayer_types::applications::transfer::error::Error as TransferError;

define_error! {
    Error {
        Decode
            [ TraceError<toml::de::Error> ]
            |_| { "invalid configuration" },

        InvalidGasPrice
            { price: String }
            |e| { format!("invalid gas price: {}", e.price) },

        InvalidDirection
            { direction: String }
            |e| { format!("invalid relay direction `{}`, expected one of `src`, `dst` or `both`", e.direction) },

        ZeroMessagesPerRound
            |_| { "the load generator must send at least one message per round" },

        InvalidAmount
            { amount: String }
            [ TransferError ]
            |e| { format!("invalid amount: {}", e.amount) },

        InvalidRetryConfig
            |_| { "the retry configuration must allow at least one attempt" },
    }
}
