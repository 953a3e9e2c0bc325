//! Wire-level request vocabulary.
//!
//! - **[method]** - [`HttpMethod`] and its conversion to `reqwest::Method`
//! - **[headers]** - [`HttpHeaders`], the ordered header container
//! - **[encoding]** - query / form / JSON parameter encoding
//! - **[constants]** - header names and content types used by the encoders

pub mod encoding;
pub mod headers;
pub mod method;

pub use encoding::{append_query, form_body, json_body, query_pairs, ParameterEncoding, Parameters};
pub use headers::HttpHeaders;
pub use method::HttpMethod;

/// Header names and media types written by the request encoders.
pub mod constants {
    /// Header names.
    pub mod headers {
        /// `Content-Type`
        pub const CONTENT_TYPE: &str = "Content-Type";
        /// `Content-Disposition`
        pub const CONTENT_DISPOSITION: &str = "Content-Disposition";
        /// `Authorization`
        pub const AUTHORIZATION: &str = "Authorization";
        /// `User-Agent`
        pub const USER_AGENT: &str = "User-Agent";
    }

    /// Media types.
    pub mod media_types {
        /// JSON bodies.
        pub const JSON: &str = "application/json";
        /// URL-encoded form bodies.
        pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded; charset=utf-8";
        /// Prefix of multipart bodies; the boundary parameter is appended.
        pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
    }
}
