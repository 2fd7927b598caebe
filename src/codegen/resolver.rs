//! Per-block code generation
//!
//! [`generator_for`] turns a frozen field list and an implementation function
//! into the [`GeneratorFn`] installed in the host registry. The implementation
//! receives a [`BlockImpl`] context: field values by key and slot resolution,
//! both restricted to the keys the definition declared.

use std::collections::HashMap;
use std::sync::Arc;

use super::{CodeHost, CodegenError, Emission, ExprCode, GeneratorFn, Order};
use crate::core::content::{Content, DropdownOptions, ValueType};
use crate::core::field::{Field, FieldIndex, FieldValue, SlotKind};
use crate::host::BlockInstance;

/// Typed access to the widget values of the block being generated
pub struct Fields<'a> {
    block: &'a dyn BlockInstance,
    index: &'a FieldIndex,
}

impl<'a> Fields<'a> {
    /// Value of the widget declared under `key`
    pub fn get(&self, key: &str) -> Result<FieldValue, CodegenError> {
        self.declared(key)?;
        self.block
            .field_value(key)
            .ok_or_else(|| CodegenError::MissingFieldValue {
                block: self.block.block_type().to_string(),
                id: self.block.id(),
                key: key.to_string(),
            })
    }

    /// Value of any widget, rendered as text
    pub fn text(&self, key: &str) -> Result<String, CodegenError> {
        Ok(self.get(key)?.to_string())
    }

    /// Value of a number widget
    pub fn number(&self, key: &str) -> Result<f64, CodegenError> {
        let declared = self.declared(key)?;
        if declared != ValueType::Number {
            return Err(CodegenError::FieldType {
                key: key.to_string(),
                declared,
                requested: ValueType::Number,
            });
        }
        match self.get(key)? {
            FieldValue::Number(n) => Ok(n),
            FieldValue::Text(text) => text.trim().parse().map_err(|_| CodegenError::NotANumber {
                key: key.to_string(),
                value: text,
            }),
        }
    }

    fn declared(&self, key: &str) -> Result<ValueType, CodegenError> {
        self.index
            .field_type(key)
            .ok_or_else(|| CodegenError::UnknownField { key: key.to_string() })
    }
}

/// Context handed to a block's implementation
pub struct BlockImpl<'a> {
    block: &'a dyn BlockInstance,
    host: &'a dyn CodeHost,
    index: &'a FieldIndex,
}

impl<'a> BlockImpl<'a> {
    pub(crate) fn new(block: &'a dyn BlockInstance, host: &'a dyn CodeHost, index: &'a FieldIndex) -> Self {
        Self { block, host, index }
    }

    /// Field values of the block
    pub fn fields(&self) -> Fields<'a> {
        Fields {
            block: self.block,
            index: self.index,
        }
    }

    /// Resolve a slot at the default order
    pub fn resolve(&self, key: &str) -> Result<String, CodegenError> {
        self.resolve_at(key, Order::NONE)
    }

    /// Resolve a slot to code.
    ///
    /// Statement slots ignore `order`; value slots hand it to the host
    /// unchanged.
    pub fn resolve_at(&self, key: &str, order: Order) -> Result<String, CodegenError> {
        match self.index.slot_kind(key) {
            Some(SlotKind::Statement) => self.host.statement_to_code(self.block, key),
            Some(SlotKind::Value) => self.host.value_to_code(self.block, key, order),
            None => Err(CodegenError::UnresolvableSlot { key: key.to_string() }),
        }
    }

    /// The live block being generated
    pub fn block(&self) -> &'a dyn BlockInstance {
        self.block
    }
}

/// Turn a statement implementation's output into the block's emission,
/// appending the code of the blocks attached below it
pub(crate) fn chain_statement(
    code: String,
    block: &dyn BlockInstance,
    host: &dyn CodeHost,
) -> Result<Emission, CodegenError> {
    let next = match block.next_block() {
        Some(next) => match host.block_to_code(next)? {
            Emission::Statement(code) => code,
            Emission::Expression { .. } => {
                return Err(CodegenError::NotAStatement {
                    block: next.block_type().to_string(),
                    id: next.id(),
                })
            }
        },
        None => String::new(),
    };

    if next.is_empty() {
        Ok(Emission::Statement(code))
    } else {
        Ok(Emission::Statement(format!("{code}\n{next}")))
    }
}

/// Turn an expression implementation's output into the block's emission
pub(crate) fn expression(code: ExprCode) -> Emission {
    Emission::Expression {
        value: code.value,
        order: code.order.unwrap_or(Order::NONE),
    }
}

/// Build the generator installed for one block
pub(crate) fn generator_for<R, F, E>(name: &str, fields: &[Field], implementation: F, emit: E) -> GeneratorFn
where
    F: Fn(&BlockImpl<'_>) -> Result<R, CodegenError> + Send + Sync + 'static,
    E: Fn(R, &dyn BlockInstance, &dyn CodeHost) -> Result<Emission, CodegenError> + Send + Sync + 'static,
{
    let index = FieldIndex::build(fields);
    let name = name.to_string();

    Arc::new(move |block: &dyn BlockInstance, host: &dyn CodeHost| {
        tracing::trace!(component = "codegen", operation = "generate", block = %name);
        let output = implementation(&BlockImpl::new(block, host, &index))?;
        emit(output, block, host)
    })
}

/// Run an implementation once against a stand-in block built from the
/// declared defaults. Only key lookups on that path are checked; any other
/// failure is the implementation's own business and is ignored here.
/// Dynamic dropdown factories are not called.
pub(crate) fn dry_run<R, F>(fields: &[Field], implementation: &F) -> Result<(), String>
where
    F: Fn(&BlockImpl<'_>) -> Result<R, CodegenError>,
{
    let index = FieldIndex::build(fields);
    let block = DefaultsBlock::from_fields(fields);

    match implementation(&BlockImpl::new(&block, &EmptyHost, &index)) {
        Err(CodegenError::UnknownField { key }) | Err(CodegenError::UnresolvableSlot { key }) => Err(key),
        Err(other) => {
            tracing::debug!(component = "codegen", operation = "dry_run", error = %other, "dry run failed");
            Ok(())
        }
        Ok(_) => Ok(()),
    }
}

struct DefaultsBlock {
    values: HashMap<String, FieldValue>,
}

impl DefaultsBlock {
    fn from_fields(fields: &[Field]) -> Self {
        let values = fields
            .iter()
            .flat_map(|field| field.content())
            .filter_map(|item| {
                let value = match item {
                    Content::Text(_) => return None,
                    Content::Dropdown { options, .. } => FieldValue::Text(match options {
                        DropdownOptions::Static(entries) => {
                            entries.first().map(|(_, value)| value.clone()).unwrap_or_default()
                        }
                        DropdownOptions::Dynamic(_) => String::new(),
                    }),
                    Content::Number { value, .. } => FieldValue::Number(*value),
                    Content::Textbox { value, .. } => FieldValue::Text(value.clone()),
                    Content::Variable { .. } => FieldValue::Text(String::new()),
                };
                Some((item.key()?.to_string(), value))
            })
            .collect();
        Self { values }
    }
}

impl BlockInstance for DefaultsBlock {
    fn block_type(&self) -> &str {
        "<dry-run>"
    }

    fn id(&self) -> String {
        "<dry-run>".to_string()
    }

    fn field_value(&self, key: &str) -> Option<FieldValue> {
        self.values.get(key).cloned()
    }

    fn next_block(&self) -> Option<&dyn BlockInstance> {
        None
    }

    fn input_target(&self, _key: &str) -> Option<&dyn BlockInstance> {
        None
    }
}

struct EmptyHost;

impl CodeHost for EmptyHost {
    fn block_to_code(&self, _block: &dyn BlockInstance) -> Result<Emission, CodegenError> {
        Ok(Emission::Statement(String::new()))
    }

    fn statement_to_code(&self, _block: &dyn BlockInstance, _key: &str) -> Result<String, CodegenError> {
        Ok(String::new())
    }

    fn value_to_code(&self, _block: &dyn BlockInstance, _key: &str, _order: Order) -> Result<String, CodegenError> {
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TypeIndicator;
    use crate::host::memory::BlockNode;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Host that records every resolve request it receives
    #[derive(Default)]
    struct RecordingHost {
        calls: RefCell<Vec<(String, Option<Order>)>>,
    }

    impl CodeHost for RecordingHost {
        fn block_to_code(&self, block: &dyn BlockInstance) -> Result<Emission, CodegenError> {
            Ok(Emission::Statement(format!("<{}>", block.block_type())))
        }

        fn statement_to_code(&self, _block: &dyn BlockInstance, key: &str) -> Result<String, CodegenError> {
            self.calls.borrow_mut().push((key.to_string(), None));
            Ok(format!("stmt:{key}"))
        }

        fn value_to_code(&self, _block: &dyn BlockInstance, key: &str, order: Order) -> Result<String, CodegenError> {
            self.calls.borrow_mut().push((key.to_string(), Some(order)));
            Ok(format!("value:{key}"))
        }
    }

    fn fields() -> Vec<Field> {
        vec![
            Field::Content(vec![
                Content::Number {
                    key: "N".into(),
                    value: 4.0,
                },
                Content::Dropdown {
                    key: "OP".into(),
                    options: ["+", "-"].into(),
                },
            ]),
            Field::Value {
                key: "A".into(),
                check: TypeIndicator::Any,
                content: vec![],
            },
            Field::Statement {
                key: "BODY".into(),
                check: TypeIndicator::Any,
            },
        ]
    }

    #[test]
    fn test_fields_read_declared_keys() {
        let fields = fields();
        let index = FieldIndex::build(&fields);
        let block = BlockNode::new("t").with_field("N", 7).with_field("OP", "-");
        let host = RecordingHost::default();
        let ctx = BlockImpl::new(&block, &host, &index);

        assert_eq!(ctx.fields().number("N").unwrap(), 7.0);
        assert_eq!(ctx.fields().text("OP").unwrap(), "-");
        assert!(matches!(
            ctx.fields().get("NOPE"),
            Err(CodegenError::UnknownField { key }) if key == "NOPE"
        ));
        assert!(matches!(
            ctx.fields().number("OP"),
            Err(CodegenError::FieldType { requested: ValueType::Number, .. })
        ));
    }

    #[test]
    fn test_number_parses_text_values() {
        let fields = fields();
        let index = FieldIndex::build(&fields);
        let host = RecordingHost::default();

        let block = BlockNode::new("t").with_field("N", " 12.5 ");
        let ctx = BlockImpl::new(&block, &host, &index);
        assert_eq!(ctx.fields().number("N").unwrap(), 12.5);

        let block = BlockNode::new("t").with_field("N", "twelve");
        let ctx = BlockImpl::new(&block, &host, &index);
        assert!(matches!(ctx.fields().number("N"), Err(CodegenError::NotANumber { .. })));
    }

    #[test]
    fn test_missing_value_for_declared_key() {
        let fields = fields();
        let index = FieldIndex::build(&fields);
        let block = BlockNode::new("t");
        let host = RecordingHost::default();
        let ctx = BlockImpl::new(&block, &host, &index);

        assert!(matches!(
            ctx.fields().get("N"),
            Err(CodegenError::MissingFieldValue { key, id, .. }) if key == "N" && id == block.id()
        ));
    }

    #[test]
    fn test_resolve_routes_by_slot_kind() {
        let fields = fields();
        let index = FieldIndex::build(&fields);
        let block = BlockNode::new("t");
        let host = RecordingHost::default();
        let ctx = BlockImpl::new(&block, &host, &index);

        assert_eq!(ctx.resolve("A").unwrap(), "value:A");
        assert_eq!(ctx.resolve_at("A", Order(3)).unwrap(), "value:A");
        assert_eq!(ctx.resolve_at("BODY", Order(3)).unwrap(), "stmt:BODY");
        assert!(matches!(
            ctx.resolve("N"),
            Err(CodegenError::UnresolvableSlot { key }) if key == "N"
        ));

        assert_eq!(
            *host.calls.borrow(),
            vec![
                ("A".to_string(), Some(Order::NONE)),
                ("A".to_string(), Some(Order(3))),
                ("BODY".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_chain_statement_appends_next() {
        let host = RecordingHost::default();
        let alone = BlockNode::new("a");
        assert_eq!(
            chain_statement("a();".into(), &alone, &host).unwrap(),
            Emission::Statement("a();".into())
        );

        let linked = BlockNode::new("a").with_next(BlockNode::new("b"));
        assert_eq!(
            chain_statement("a();".into(), &linked, &host).unwrap(),
            Emission::Statement("a();\n<b>".into())
        );
    }

    fn uses_declared(ctx: &BlockImpl<'_>) -> Result<String, CodegenError> {
        Ok(format!(
            "{}{}{}",
            ctx.fields().number("N")?,
            ctx.resolve("A")?,
            ctx.resolve("BODY")?
        ))
    }

    fn reads_missing_field(ctx: &BlockImpl<'_>) -> Result<String, CodegenError> {
        ctx.fields().text("MISSING")
    }

    fn resolves_missing_slot(ctx: &BlockImpl<'_>) -> Result<String, CodegenError> {
        ctx.resolve("ELSE")
    }

    fn always_fails(_: &BlockImpl<'_>) -> Result<String, CodegenError> {
        Err(anyhow::anyhow!("not today").into())
    }

    #[test]
    fn test_dry_run_reports_undeclared_keys() {
        let fields = fields();
        assert_eq!(dry_run(&fields, &uses_declared), Ok(()));
        assert_eq!(dry_run(&fields, &reads_missing_field), Err("MISSING".to_string()));
        assert_eq!(dry_run(&fields, &resolves_missing_slot), Err("ELSE".to_string()));
    }

    #[test]
    fn test_dry_run_ignores_other_failures() {
        assert_eq!(dry_run(&fields(), &always_fails), Ok(()));
    }

    #[test]
    fn test_dry_run_leaves_dynamic_dropdowns_alone() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let fields = vec![Field::Content(vec![Content::Dropdown {
            key: "MODE".into(),
            options: DropdownOptions::dynamic(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                vec!["a".to_string()]
            }),
        }])];

        let reads_mode = |ctx: &BlockImpl<'_>| ctx.fields().text("MODE");
        assert_eq!(dry_run(&fields, &reads_mode), Ok(()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    /// Only the path taken with default values is checked at registration
    #[test]
    fn test_dry_run_follows_default_branch() {
        let fields = vec![Field::Content(vec![Content::Dropdown {
            key: "MODE".into(),
            options: ["a", "b"].into(),
        }])];
        let branches = |ctx: &BlockImpl<'_>| -> Result<String, CodegenError> {
            if ctx.fields().text("MODE")? == "b" {
                return ctx.resolve("ELSE");
            }
            Ok(String::new())
        };
        assert_eq!(dry_run(&fields, &branches), Ok(()));

        let index = FieldIndex::build(&fields);
        let host = RecordingHost::default();
        let block = BlockNode::new("t").with_field("MODE", "b");
        assert!(matches!(
            branches(&BlockImpl::new(&block, &host, &index)),
            Err(CodegenError::UnresolvableSlot { key }) if key == "ELSE"
        ));
    }

    proptest! {
        /// Value slots hand the requested order to the host unchanged.
        #[test]
        fn resolve_at_passes_order_through(order in 0u8..=99) {
            let fields = fields();
            let index = FieldIndex::build(&fields);
            let block = BlockNode::new("t");
            let host = RecordingHost::default();
            let ctx = BlockImpl::new(&block, &host, &index);

            prop_assert_eq!(ctx.resolve_at("A", Order(order)).unwrap(), "value:A");
            prop_assert_eq!(host.calls.borrow().clone(), vec![("A".to_string(), Some(Order(order)))]);
        }
    }
}
