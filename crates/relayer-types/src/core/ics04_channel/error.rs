use core::num::ParseIntError;

use flex_error::{define_error, TraceError};

define_error! {
    Error {
        InvalidSequence
            { value: String }
            [ TraceError<ParseIntError> ]
            |e| { format!("`{}` is not a packet sequence", e.value) },

        ZeroPacketData
            |_| { "a packet must carry some data" },
    }
}
