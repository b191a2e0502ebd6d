//! Declarative layout resource format.
//!
//! One XML file describes one keyboard page:
//!
//! ```xml
//! <Layout name="English (US)">
//!   <Row type="letters">
//!     <Key symbol="q" keystroke="q"/>
//!     <Spacer width="0.5"/>
//!     <Key symbol="ICON_SHIFT" style="Secondary" width="1.5" layoutLink="en-US-shift.xml"/>
//!   </Row>
//! </Layout>
//! ```
//!
//! | Element  | Attribute    | Default  |
//! |----------|--------------|----------|
//! | root     | `name`       | `"Unknown Layout"` |
//! | `Row`    | `type`       | absent   |
//! | `Key`    | `symbol`     | `""`     |
//! | `Key`    | `style`      | `"Std"`  |
//! | `Key`    | `keystroke`  | absent   |
//! | `Key`    | `width`      | `1.0`    |
//! | `Key`    | `layoutLink` | absent   |
//! | `Spacer` | `width`      | `1.0`    |
//!
//! The root element's tag is not checked.  Unknown elements are skipped.

pub mod parser;

pub use parser::{parse_layout, FormatError};
