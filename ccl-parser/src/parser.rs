use ccl_ast::{
    BinaryOperator, BracketTarget, ColRange, ColRef, Expr, LValue, Literal, Program, RowRange,
    RowRef, Statement, UnaryOperator,
};
use ccl_lexer::{Lexer, Token};

use crate::{
    error::{parse_error, ParserError},
    peek::{MultiPeek, PeekIteratorExt},
};

/// Which of the three CCL entry points a [`Parser`] is parsing for.
///
/// The grammar is identical across all three except for what a "program" is
/// allowed to consist of: a full statement list, or exactly one bare
/// expression with assignment forms rejected.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EntryMode {
    /// `table.execute_ccl(program)`: one or more `target = expr` statements.
    Execute,
    /// `table.add_col_using_ccl(name, expr)`: a single expression; `=` and
    /// `NEW(...)` are rejected at parse time.
    AddColumn,
    /// `table.edit_col_using_ccl(col, expr)`: same restriction as add mode.
    EditColumn,
}

impl EntryMode {
    fn allows_assignment(self) -> bool {
        matches!(self, EntryMode::Execute)
    }
}

const OR_PREC: u8 = 5;
const AND_PREC: u8 = 10;
const COMPARISON_PREC: u8 = 20;
const CONCAT_PREC: u8 = 25;
const PLUS_MINUS_PREC: u8 = 30;
const MUL_DIV_PREC: u8 = 40;
const CARET_PREC: u8 = 50;
const UNARY_MINUS_PREC: u8 = 60;

/// A CCL parser over a fixed token stream.
pub struct Parser {
    mode: EntryMode,
    iter: MultiPeek<std::vec::IntoIter<Token>>,
}

impl Parser {
    /// Creates a parser over an already-tokenized stream.
    pub fn new_with_tokens(mode: EntryMode, tokens: Vec<Token>) -> Self {
        Self {
            mode,
            iter: tokens.into_iter().multipeek(),
        }
    }

    /// Creates a parser over raw CCL source, tokenizing it first.
    pub fn new_with_source(mode: EntryMode, source: &str) -> Result<Self, ParserError> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self::new_with_tokens(mode, tokens))
    }

    /// Parses a full multi-statement program (valid for any mode, though
    /// only [`EntryMode::Execute`] is expected to use it directly).
    pub fn parse_program(&mut self) -> Result<Program, ParserError> {
        let mut program = Program::new();
        self.skip_statement_ends();
        while self.peek_token().is_some() {
            program.push(self.parse_statement()?);
            if self.peek_token().is_some() {
                self.expect_statement_end()?;
                self.skip_statement_ends();
            }
        }
        Ok(program)
    }

    /// Parses a single expression, for [`EntryMode::AddColumn`] or
    /// [`EntryMode::EditColumn`]. Rejects leftover tokens once the
    /// expression is fully consumed.
    pub fn parse_single_expr(&mut self) -> Result<Expr, ParserError> {
        self.skip_statement_ends();
        let expr = self.parse_expr()?;
        self.skip_statement_ends();
        if let Some(token) = self.peek_token() {
            return parse_error(format!("unexpected trailing token '{token}'"));
        }
        Ok(expr)
    }

    fn parse_statement(&mut self) -> Result<Statement, ParserError> {
        if !self.mode.allows_assignment() {
            let expr = self.parse_expr()?;
            return Ok(Statement::Expr(expr));
        }

        let target = self.parse_lvalue()?;
        self.expect_token(Token::Equal)?;
        let expr = self.parse_expr()?;
        Ok(Statement::Assign { target, expr })
    }

    fn parse_lvalue(&mut self) -> Result<LValue, ParserError> {
        if self.peek_is_keyword("NEW") && self.peek_nth_is(1, &Token::LeftParen) {
            self.next_token();
            self.next_token();
            let name = self.expect_string()?;
            self.expect_token(Token::RightParen)?;
            return Ok(LValue::New(name));
        }
        if self.next_token_if_is(&Token::LeftBracket) {
            let target = match self.next_token() {
                Some(Token::String(s)) => BracketTarget::Name(s),
                Some(Token::Ident(s)) => BracketTarget::Letter(s),
                other => return self.expected("a column letter or quoted name", other),
            };
            self.expect_token(Token::RightBracket)?;
            return Ok(LValue::Bracket(target));
        }
        match self.next_token() {
            Some(Token::Ident(name)) => Ok(LValue::Ident(name)),
            other => self.expected("an assignment target", other),
        }
    }

    /// Parses a complete expression.
    pub fn parse_expr(&mut self) -> Result<Expr, ParserError> {
        self.parse_subexpr(0)
    }

    fn parse_subexpr(&mut self, precedence: u8) -> Result<Expr, ParserError> {
        let mut expr = self.parse_prefix()?;
        loop {
            let next_precedence = self.next_precedence();
            if precedence >= next_precedence {
                break;
            }
            expr = self.parse_infix(Box::new(expr), next_precedence)?;
        }
        Ok(expr)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParserError> {
        match self.peek_token().cloned() {
            Some(Token::Number(s)) => {
                self.next_token();
                Ok(Expr::Literal(Literal::Number(s)))
            }
            Some(Token::String(s)) => {
                self.next_token();
                Ok(Expr::Literal(Literal::String(s)))
            }
            Some(Token::At) => {
                self.next_token();
                Ok(Expr::At)
            }
            Some(Token::Minus) => {
                self.next_token();
                let expr = self.parse_subexpr(UNARY_MINUS_PREC)?;
                Ok(Expr::Unary {
                    op: UnaryOperator::Negate,
                    expr: Box::new(expr),
                })
            }
            Some(Token::LeftParen) => {
                self.next_token();
                let expr = self.parse_expr()?;
                self.expect_token(Token::RightParen)?;
                Ok(Expr::Nested(Box::new(expr)))
            }
            Some(Token::LeftBracket) => {
                let start = self.parse_col_ref()?;
                self.parse_column_access(start)
            }
            Some(Token::Ident(name)) => {
                if self.peek_nth_is(1, &Token::LeftParen) {
                    if !self.mode.allows_assignment() && name.eq_ignore_ascii_case("NEW") {
                        return parse_error("NEW(...) is not allowed here");
                    }
                    self.next_token();
                    self.next_token();
                    let args = self.parse_call_args()?;
                    self.expect_token(Token::RightParen)?;
                    Ok(Expr::Call { name, args })
                } else {
                    self.next_token();
                    self.parse_column_access(ColRef::Bare(name))
                }
            }
            other => self.expected("an expression", other),
        }
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParserError> {
        let mut args = vec![];
        if self.peek_token() == Some(&Token::RightParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if !self.next_token_if_is(&Token::Comma) {
                break;
            }
        }
        Ok(args)
    }

    fn parse_col_ref(&mut self) -> Result<ColRef, ParserError> {
        if self.next_token_if_is(&Token::LeftBracket) {
            let col_ref = match self.next_token() {
                Some(Token::String(s)) => ColRef::BracketName(s),
                Some(Token::Ident(s)) => ColRef::BracketLetter(s),
                other => return self.expected("a column letter or quoted name", other),
            };
            self.expect_token(Token::RightBracket)?;
            Ok(col_ref)
        } else {
            match self.next_token() {
                Some(Token::Ident(s)) => Ok(ColRef::Bare(s)),
                other => self.expected("a column reference", other),
            }
        }
    }

    fn parse_column_access(&mut self, start: ColRef) -> Result<Expr, ParserError> {
        let end = if self.next_token_if_is(&Token::Colon) {
            Some(self.parse_col_ref()?)
        } else {
            None
        };
        let col = ColRange { start, end };
        let row = if self.next_token_if_is(&Token::Dot) {
            Some(self.parse_row_range()?)
        } else {
            None
        };
        Ok(Expr::Column { col, row })
    }

    fn parse_row_range(&mut self) -> Result<RowRange, ParserError> {
        let start = self.parse_row_ref()?;
        let end = if self.next_token_if_is(&Token::Colon) {
            Some(self.parse_row_ref()?)
        } else {
            None
        };
        Ok(RowRange { start, end })
    }

    fn parse_row_ref(&mut self) -> Result<RowRef, ParserError> {
        let negative = self.next_token_if_is(&Token::Minus);
        match self.next_token() {
            Some(Token::Number(s)) => {
                let index: i64 = s
                    .parse()
                    .map_err(|_| ParserError::Syntax(format!("'{s}' is not a valid row index")))?;
                Ok(RowRef::Index(if negative { -index } else { index }))
            }
            Some(Token::String(s)) if !negative => Ok(RowRef::Name(s)),
            other => self.expected("a row index or quoted row name", other),
        }
    }

    fn next_precedence(&mut self) -> u8 {
        let mode = self.mode;
        let precedence = match self.peek_token() {
            Some(token) if token.is_keyword("OR") => OR_PREC,
            Some(token) if token.is_keyword("AND") => AND_PREC,
            Some(Token::Equal) if mode.allows_assignment() => COMPARISON_PREC,
            Some(Token::NotEqual)
            | Some(Token::Less)
            | Some(Token::LessEqual)
            | Some(Token::Greater)
            | Some(Token::GreaterEqual) => COMPARISON_PREC,
            Some(Token::Ampersand) => CONCAT_PREC,
            Some(Token::Plus) | Some(Token::Minus) => PLUS_MINUS_PREC,
            Some(Token::Star) | Some(Token::Slash) | Some(Token::Percent) => MUL_DIV_PREC,
            Some(Token::Caret) => CARET_PREC,
            _ => 0,
        };
        self.reset_peek_cursor();
        precedence
    }

    fn parse_infix(&mut self, left: Box<Expr>, precedence: u8) -> Result<Expr, ParserError> {
        let token = self.next_token();
        let op = match &token {
            Some(Token::Ident(s)) if s.eq_ignore_ascii_case("AND") => BinaryOperator::And,
            Some(Token::Ident(s)) if s.eq_ignore_ascii_case("OR") => BinaryOperator::Or,
            Some(Token::Equal) => BinaryOperator::Equal,
            Some(Token::NotEqual) => BinaryOperator::NotEqual,
            Some(Token::Less) => BinaryOperator::Less,
            Some(Token::LessEqual) => BinaryOperator::LessOrEqual,
            Some(Token::Greater) => BinaryOperator::Greater,
            Some(Token::GreaterEqual) => BinaryOperator::GreaterOrEqual,
            Some(Token::Ampersand) => BinaryOperator::Concat,
            Some(Token::Plus) => BinaryOperator::Plus,
            Some(Token::Minus) => BinaryOperator::Minus,
            Some(Token::Star) => BinaryOperator::Multiply,
            Some(Token::Slash) => BinaryOperator::Divide,
            Some(Token::Percent) => BinaryOperator::Modulo,
            Some(Token::Caret) => BinaryOperator::Power,
            _ => return parse_error(format!("no infix parser for token {token:?}")),
        };
        // `^` is right-associative: recurse one level looser so a chained
        // `A^B^C` groups as `A^(B^C)`.
        let right_precedence = if op == BinaryOperator::Power {
            precedence - 1
        } else {
            precedence
        };
        let right = self.parse_subexpr(right_precedence)?;
        Ok(Expr::Binary {
            left,
            op,
            right: Box::new(right),
        })
    }

    fn skip_statement_ends(&mut self) {
        while self.next_token_if_is(&Token::StatementEnd) {}
    }

    fn expect_statement_end(&mut self) -> Result<(), ParserError> {
        if self.next_token_if_is(&Token::StatementEnd) {
            Ok(())
        } else {
            let found = self.peek_token().cloned();
            self.expected("end of statement (';' or a newline)", found)
        }
    }

    fn expect_string(&mut self) -> Result<String, ParserError> {
        match self.next_token() {
            Some(Token::String(s)) => Ok(s),
            other => self.expected("a quoted string", other),
        }
    }

    fn expect_token(&mut self, expected: Token) -> Result<(), ParserError> {
        if self.next_token_if_is(&expected) {
            Ok(())
        } else {
            let found = self.peek_token().cloned();
            self.expected(expected, found)
        }
    }

    fn expected<R>(
        &self,
        expected: impl std::fmt::Display,
        found: Option<impl std::fmt::Display>,
    ) -> Result<R, ParserError> {
        match found {
            Some(found) => parse_error(format!("expected {expected}, found '{found}'")),
            None => parse_error(format!("expected {expected}, but reached end of input")),
        }
    }

    fn peek_is_keyword(&mut self, keyword: &str) -> bool {
        let is = matches!(self.peek_token(), Some(Token::Ident(s)) if s.eq_ignore_ascii_case(keyword));
        self.reset_peek_cursor();
        is
    }

    fn peek_nth_is(&mut self, n: usize, expected: &Token) -> bool {
        let mut token = None;
        for _ in 0..=n {
            token = self.iter.peek_next();
        }
        let matches = token == Some(expected);
        self.reset_peek_cursor();
        matches
    }

    fn peek_token(&mut self) -> Option<&Token> {
        self.iter.peek()
    }

    fn reset_peek_cursor(&mut self) {
        self.iter.reset_cursor();
    }

    fn next_token(&mut self) -> Option<Token> {
        self.iter.next()
    }

    fn next_token_if_is(&mut self, expected: &Token) -> bool {
        self.iter.next_if_eq(expected).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_program(src: &str) -> Result<Program, ParserError> {
        Parser::new_with_source(EntryMode::Execute, src)?.parse_program()
    }

    fn parse_add(src: &str) -> Result<Expr, ParserError> {
        Parser::new_with_source(EntryMode::AddColumn, src)?.parse_single_expr()
    }

    #[test]
    fn parses_simple_assignment() {
        let program = parse_program("C = A + B").unwrap();
        assert_eq!(
            program,
            vec![Statement::Assign {
                target: LValue::Ident("C".into()),
                expr: Expr::Binary {
                    left: Box::new(Expr::Column {
                        col: ColRange {
                            start: ColRef::Bare("A".into()),
                            end: None
                        },
                        row: None
                    }),
                    op: BinaryOperator::Plus,
                    right: Box::new(Expr::Column {
                        col: ColRange {
                            start: ColRef::Bare("B".into()),
                            end: None
                        },
                        row: None
                    }),
                }
            }]
        );
    }

    #[test]
    fn parses_new_column_target() {
        let program = parse_program("NEW('total') = SUM(@)").unwrap();
        match &program[0] {
            Statement::Assign { target, expr } => {
                assert_eq!(target, &LValue::New("total".into()));
                assert_eq!(
                    expr,
                    &Expr::Call {
                        name: "SUM".into(),
                        args: vec![Expr::At],
                    }
                );
            }
            _ => panic!("expected an assignment"),
        }
    }

    #[test]
    fn parses_multiple_statements_separated_by_newline_or_semicolon() {
        let program = parse_program("A = 1\nB = 2; C = 3").unwrap();
        assert_eq!(program.len(), 3);
    }

    #[test]
    fn power_is_right_associative() {
        let expr = parse_add("A^B^C").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                left: Box::new(Expr::Column {
                    col: ColRange {
                        start: ColRef::Bare("A".into()),
                        end: None
                    },
                    row: None
                }),
                op: BinaryOperator::Power,
                right: Box::new(Expr::Binary {
                    left: Box::new(Expr::Column {
                        col: ColRange {
                            start: ColRef::Bare("B".into()),
                            end: None
                        },
                        row: None
                    }),
                    op: BinaryOperator::Power,
                    right: Box::new(Expr::Column {
                        col: ColRange {
                            start: ColRef::Bare("C".into()),
                            end: None
                        },
                        row: None
                    }),
                }),
            }
        );
    }

    #[test]
    fn unary_minus_binds_tighter_than_power() {
        let expr = parse_add("-A^2").unwrap();
        match expr {
            Expr::Binary { left, op, .. } => {
                assert_eq!(op, BinaryOperator::Power);
                assert!(matches!(*left, Expr::Unary { .. }));
            }
            _ => panic!("expected a binary power expression"),
        }
    }

    #[test]
    fn parses_dot_row_and_column_ranges() {
        let expr = parse_add("A:B.0:1").unwrap();
        assert_eq!(
            expr,
            Expr::Column {
                col: ColRange {
                    start: ColRef::Bare("A".into()),
                    end: Some(ColRef::Bare("B".into())),
                },
                row: Some(RowRange {
                    start: RowRef::Index(0),
                    end: Some(RowRef::Index(1)),
                }),
            }
        );
    }

    #[test]
    fn parses_bracket_name_row_reference() {
        let expr = parse_add("['total'].'q1'").unwrap();
        assert_eq!(
            expr,
            Expr::Column {
                col: ColRange {
                    start: ColRef::BracketName("total".into()),
                    end: None,
                },
                row: Some(RowRange {
                    start: RowRef::Name("q1".into()),
                    end: None,
                }),
            }
        );
    }

    #[test]
    fn add_column_mode_rejects_assignment() {
        let err = Parser::new_with_source(EntryMode::AddColumn, "A = B")
            .unwrap()
            .parse_single_expr();
        assert!(err.is_err());
    }

    #[test]
    fn add_column_mode_rejects_new() {
        let err = Parser::new_with_source(EntryMode::AddColumn, "NEW('x')")
            .unwrap()
            .parse_single_expr();
        assert!(err.is_err());
    }

    #[test]
    fn execute_mode_rejects_bare_expression_statement() {
        let err = parse_program("A + B");
        assert!(err.is_err());
    }

    #[test]
    fn and_or_and_comparison_precedence() {
        let expr = Parser::new_with_source(EntryMode::Execute, "A = 1 OR B = 2 AND C != 3")
            .unwrap()
            .parse_single_expr()
            .unwrap();
        // OR is loosest, so the tree root is the OR.
        match expr {
            Expr::Binary { op, .. } => assert_eq!(op, BinaryOperator::Or),
            _ => panic!("expected OR at the root"),
        }
    }
}
