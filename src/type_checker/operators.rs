use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::ast::types::{BinaryOperator, Type, UnaryOperator};

lazy_static! {
    /// `(left, operator, right) -> result` for every legal binary operation.
    ///
    /// There are no mixed `int`/`float` entries: such arithmetic is rejected.
    pub static ref BINARY_OPERATORS: HashMap<(Type, BinaryOperator, Type), Type> = {
        use BinaryOperator::*;

        let mut table = HashMap::new();

        for ty in [Type::Int, Type::Float] {
            for op in [Add, Subtract, Multiply, Divide] {
                table.insert((ty, op, ty), ty);
            }
            for op in [Less, Greater, LessEquals, GreaterEquals, Equals, NotEquals] {
                table.insert((ty, op, ty), Type::Bool);
            }
        }

        for op in [And, Or, Equals, NotEquals] {
            table.insert((Type::Bool, op, Type::Bool), Type::Bool);
        }

        table
    };

    pub static ref UNARY_OPERATORS: HashMap<(UnaryOperator, Type), Type> = {
        let mut table = HashMap::new();

        for ty in [Type::Int, Type::Float] {
            table.insert((UnaryOperator::Plus, ty), ty);
            table.insert((UnaryOperator::Minus, ty), ty);
        }

        table
    };
}

pub fn binary_result(left: Type, operator: BinaryOperator, right: Type) -> Option<Type> {
    BINARY_OPERATORS.get(&(left, operator, right)).copied()
}

pub fn unary_result(operator: UnaryOperator, operand: Type) -> Option<Type> {
    UNARY_OPERATORS.get(&(operator, operand)).copied()
}
