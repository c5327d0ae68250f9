use flex_error::define_error;

define_error! {
    ValidationError {
        ContainSeparator
            { id: String }
            |e| { format!("identifier `{}` must not contain a path separator", e.id) },

        InvalidLength
            { id: String, length: usize, min: usize, max: usize }
            |e| {
                format!("identifier `{}` is {} characters long, expected {} to {}",
                    e.id, e.length, e.min, e.max)
            },

        InvalidCharacter
            { id: String }
            |e| {
                format!("identifier `{}` may only contain alphanumerics and `._+-#[]<>`", e.id)
            },

        Empty
            |_| { "empty identifier" },
    }
}
