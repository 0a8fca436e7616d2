//! Expression trees carried by commands.
//!
//! The compiler core does not parse or evaluate the expression language;
//! it only needs enough structure to fold constants, decide purity, and
//! find variable references. Anything it cannot reason about is carried
//! through the pipeline untouched.

/// Binary operators the optimizer understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    /// Logical and, short-circuit, returns an operand value.
    And,
    /// Logical or, short-circuit, returns an operand value.
    Or,
    /// String concatenation.
    Concatenate,
    /// Equality.
    Eq,
    /// Inequality.
    Neq,
    /// Numeric addition.
    Add,
}

/// Unary operators the optimizer understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Logical negation.
    Not,
    /// Emptiness test for strings and collections.
    IsEmpty,
}

/// Markup context in which an output expression is rendered.
///
/// Escaping is applied by the backend; the core only transports the hint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkupContext {
    Html,
    Text,
    Attribute,
    Uri,
    Script,
    Style,
    Comment,
    Number,
}

impl MarkupContext {
    /// The context's canonical name, as written in template option values.
    pub fn as_str(self) -> &'static str {
        match self {
            MarkupContext::Html => "html",
            MarkupContext::Text => "text",
            MarkupContext::Attribute => "attribute",
            MarkupContext::Uri => "uri",
            MarkupContext::Script => "scriptString",
            MarkupContext::Style => "styleString",
            MarkupContext::Comment => "comment",
            MarkupContext::Number => "number",
        }
    }

    /// Look up a context by its canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "html" => Some(MarkupContext::Html),
            "text" => Some(MarkupContext::Text),
            "attribute" => Some(MarkupContext::Attribute),
            "uri" => Some(MarkupContext::Uri),
            "scriptString" => Some(MarkupContext::Script),
            "styleString" => Some(MarkupContext::Style),
            "comment" => Some(MarkupContext::Comment),
            "number" => Some(MarkupContext::Number),
            _ => None,
        }
    }
}

/// A node in an expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum ExpressionNode {
    BooleanConstant(bool),
    StringConstant(String),
    NumericConstant(f64),
    NullLiteral,
    /// A reference to a variable in scope.
    Identifier(String),
    BinaryOperation {
        operator: BinaryOperator,
        left: Box<ExpressionNode>,
        right: Box<ExpressionNode>,
    },
    UnaryOperation {
        operator: UnaryOperator,
        operand: Box<ExpressionNode>,
    },
    TernaryOperator {
        condition: Box<ExpressionNode>,
        then_branch: Box<ExpressionNode>,
        else_branch: Box<ExpressionNode>,
    },
    PropertyAccess {
        target: Box<ExpressionNode>,
        property: Box<ExpressionNode>,
    },
    ArrayLiteral(Vec<ExpressionNode>),
    MapLiteral(Vec<(String, ExpressionNode)>),
    /// A call into the host runtime. Never assumed pure.
    RuntimeCall {
        function: String,
        arguments: Vec<ExpressionNode>,
    },
}

impl ExpressionNode {
    /// Create a string constant node.
    pub fn string(value: impl Into<String>) -> Self {
        ExpressionNode::StringConstant(value.into())
    }

    /// Create an identifier node.
    pub fn identifier(name: impl Into<String>) -> Self {
        ExpressionNode::Identifier(name.into())
    }

    /// Create a binary operation node.
    pub fn binary(operator: BinaryOperator, left: ExpressionNode, right: ExpressionNode) -> Self {
        ExpressionNode::BinaryOperation {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Create a unary operation node.
    pub fn unary(operator: UnaryOperator, operand: ExpressionNode) -> Self {
        ExpressionNode::UnaryOperation {
            operator,
            operand: Box::new(operand),
        }
    }

    /// Whether this node is provably constant at compile time.
    ///
    /// Literals are constant; arrays and maps are constant when every
    /// element is. Identifiers and operations are not, even over
    /// constants, until folding rewrites them.
    pub fn is_constant(&self) -> bool {
        match self {
            ExpressionNode::BooleanConstant(_)
            | ExpressionNode::StringConstant(_)
            | ExpressionNode::NumericConstant(_)
            | ExpressionNode::NullLiteral => true,
            ExpressionNode::ArrayLiteral(items) => items.iter().all(ExpressionNode::is_constant),
            ExpressionNode::MapLiteral(entries) => {
                entries.iter().all(|(_, value)| value.is_constant())
            }
            _ => false,
        }
    }

    /// Compile-time truthiness, for constant nodes only.
    ///
    /// Empty strings, null, zero, and empty collections are false.
    pub fn truth_value(&self) -> Option<bool> {
        match self {
            ExpressionNode::BooleanConstant(value) => Some(*value),
            ExpressionNode::StringConstant(value) => Some(!value.is_empty()),
            ExpressionNode::NumericConstant(value) => Some(*value != 0.0),
            ExpressionNode::NullLiteral => Some(false),
            ExpressionNode::ArrayLiteral(items) if self.is_constant() => Some(!items.is_empty()),
            ExpressionNode::MapLiteral(entries) if self.is_constant() => Some(!entries.is_empty()),
            _ => None,
        }
    }

    /// Whether evaluating this expression can have side effects.
    ///
    /// Only runtime calls are treated as effectful; everything else in
    /// the expression language is read-only.
    pub fn is_pure(&self) -> bool {
        match self {
            ExpressionNode::RuntimeCall { .. } => false,
            ExpressionNode::BooleanConstant(_)
            | ExpressionNode::StringConstant(_)
            | ExpressionNode::NumericConstant(_)
            | ExpressionNode::NullLiteral
            | ExpressionNode::Identifier(_) => true,
            ExpressionNode::BinaryOperation { left, right, .. } => {
                left.is_pure() && right.is_pure()
            }
            ExpressionNode::UnaryOperation { operand, .. } => operand.is_pure(),
            ExpressionNode::TernaryOperator {
                condition,
                then_branch,
                else_branch,
            } => condition.is_pure() && then_branch.is_pure() && else_branch.is_pure(),
            ExpressionNode::PropertyAccess { target, property } => {
                target.is_pure() && property.is_pure()
            }
            ExpressionNode::ArrayLiteral(items) => items.iter().all(ExpressionNode::is_pure),
            ExpressionNode::MapLiteral(entries) => {
                entries.iter().all(|(_, value)| value.is_pure())
            }
        }
    }

    /// Visit every variable referenced anywhere in this tree.
    pub fn referenced_variables(&self, visit: &mut impl FnMut(&str)) {
        match self {
            ExpressionNode::Identifier(name) => visit(name),
            ExpressionNode::BinaryOperation { left, right, .. } => {
                left.referenced_variables(visit);
                right.referenced_variables(visit);
            }
            ExpressionNode::UnaryOperation { operand, .. } => operand.referenced_variables(visit),
            ExpressionNode::TernaryOperator {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.referenced_variables(visit);
                then_branch.referenced_variables(visit);
                else_branch.referenced_variables(visit);
            }
            ExpressionNode::PropertyAccess { target, property } => {
                target.referenced_variables(visit);
                property.referenced_variables(visit);
            }
            ExpressionNode::ArrayLiteral(items) => {
                for item in items {
                    item.referenced_variables(visit);
                }
            }
            ExpressionNode::MapLiteral(entries) => {
                for (_, value) in entries {
                    value.referenced_variables(visit);
                }
            }
            ExpressionNode::RuntimeCall { arguments, .. } => {
                for argument in arguments {
                    argument.referenced_variables(visit);
                }
            }
            ExpressionNode::BooleanConstant(_)
            | ExpressionNode::StringConstant(_)
            | ExpressionNode::NumericConstant(_)
            | ExpressionNode::NullLiteral => {}
        }
    }
}
