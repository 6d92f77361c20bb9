// Resume → canonical CV.
// extract (text producer) → llm_client (JSON producer) → normalize (pure core).
// Only `normalize` and the modules it uses are free of I/O.

pub mod coerce;
pub mod dates;
pub mod extract;
pub mod handlers;
pub mod ingest;
pub mod normalize;
pub mod prompts;
pub mod schema;
pub mod sections;
