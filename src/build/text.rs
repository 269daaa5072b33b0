use std::{cell::RefCell, rc::Rc};

use serde_json::Value;

use crate::{
    animation::{
        animator::{AnimatorScope, Slot},
        container::{Adapter, PropertyContainer},
        value::TextValue,
    },
    build::composition::BuildContext,
    scene::{draw::TextNode, node::NodeRef},
};

/// Pushes the current text document (`t.d`) into a text node.
pub(crate) struct TextAdapter {
    document: Slot<TextValue>,
    node: Rc<RefCell<TextNode>>,
}

impl Adapter for TextAdapter {
    fn on_sync(&mut self) {
        self.node.borrow_mut().set_value(&self.document.borrow());
    }
}

impl BuildContext<'_> {
    pub(crate) fn attach_text_layer(
        &mut self,
        jlayer: &Value,
        scope: &mut AnimatorScope,
    ) -> Option<NodeRef> {
        let mut text_scope = AnimatorScope::new();
        let document = Slot::new(TextValue::default());
        if !self
            .binder
            .bind(&jlayer["t"]["d"], &mut text_scope, &document)
        {
            self.binder.warn("Text layer without a text document.", None);
            return None;
        }

        let node = Rc::new(RefCell::new(TextNode::new()));
        PropertyContainer::new(
            text_scope,
            TextAdapter {
                document,
                node: Rc::clone(&node),
            },
        )
        .attach_discardable(scope);
        Some(node as NodeRef)
    }
}
