//! Marked content operators.
//!
//! Handles: MP, DP, BMC, BDC, EMC, BX, EX
//!
//! - MP/DP: Marked content point (DP with a property list)
//! - BMC/BDC: Begin marked content sequence (BDC with a property list)
//! - EMC: End marked content sequence
//! - BX/EX: Compatibility section brackets
//!
//! A property list is either an inline dictionary or the name of an entry in
//! the Properties resource.

use crate::diagnostics::{Warning, WarningKind};
use crate::interp::device::PDFDevice;
use crate::interp::interpreter::ContentInterpreter;
use crate::model::objects::{PDFDict, PDFObject};

#[allow(non_snake_case)]
impl<'a, D: PDFDevice> ContentInterpreter<'a, D> {
    fn property_list(&mut self, operator: &str, props: &PDFObject) -> Option<PDFDict> {
        match props {
            PDFObject::Dict(dict) => Some(dict.clone()),
            PDFObject::Name(name) => {
                let found = self.lookup().properties(name).cloned();
                if found.is_none() {
                    self.warn(
                        Warning::new(
                            WarningKind::MissingResource,
                            format!("property list {name} not found"),
                        )
                        .operator(operator),
                    );
                }
                found
            }
            _ => None,
        }
    }

    /// PDF operator: `MP`
    pub fn do_MP(&mut self, tag: &str) {
        self.device.do_tag(tag, None);
    }

    /// PDF operator: `DP`
    pub fn do_DP(&mut self, tag: &str, props: &PDFObject) {
        let props = self.property_list("DP", props);
        self.device.do_tag(tag, props.as_ref());
    }

    /// PDF operator: `BMC`
    pub fn do_BMC(&mut self, tag: &str) {
        self.device.begin_tag(tag, None);
    }

    /// Begin a marked content sequence with a property list. A missing named
    /// property list is reported and the sequence still begins.
    ///
    /// PDF operator: `BDC`
    pub fn do_BDC(&mut self, tag: &str, props: &PDFObject) {
        let props = self.property_list("BDC", props);
        self.device.begin_tag(tag, props.as_ref());
    }

    /// PDF operator: `EMC`
    pub fn do_EMC(&mut self) {
        self.device.end_tag();
    }

    /// Begin a compatibility section. Unknown operators are ignored
    /// everywhere, so nothing changes inside one.
    ///
    /// PDF operator: `BX`
    pub fn do_BX(&mut self) {}

    /// PDF operator: `EX`
    pub fn do_EX(&mut self) {}
}
