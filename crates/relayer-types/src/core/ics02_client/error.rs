use core::num::ParseIntError;

use flex_error::{define_error, TraceError};

define_error! {
    Error {
        InvalidHeight
            | _ | { "height cannot end up zero or negative" },

        InvalidHeightResult
            | _ | { "height cannot end up zero or negative" },

        HeightConversion
            { height: String }
            [ TraceError<ParseIntError> ]
            | e | {
                format_args!("cannot convert into a `Height` type from string {0}",
                    e.height)
            },

        InvalidHeightFormat
            { height: String }
            | e | {
                format_args!("height {0} is not in the `{{revision_number}}-{{revision_height}}` format",
                    e.height)
            },
    }
}
