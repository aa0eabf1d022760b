//! Recursive descent over one SELECT statement.

use super::error::ParseError;
use super::pratt::{prefix, Infix};
use crate::ast::{
    BinaryOp, DataType, Expr, FromItem, FunctionCall, JoinClause, JoinType, Literal, NullOrdering,
    OrderBy, OrderDirection, Qualifier, SelectColumn, SelectStatement, TableRef,
};
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};

/// Parser for one SELECT statement whose column and table references may be
/// dotted object paths of any length.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
    /// Number of `?` placeholders read so far.
    param_counter: usize,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            previous: Token::new(TokenKind::Eof, Span::point(0)),
            param_counter: 0,
        }
    }

    /// Parses a complete query: one SELECT statement, an optional `;`, then
    /// the end of input.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the input is not a valid SELECT statement.
    pub fn parse_query(&mut self) -> Result<SelectStatement, ParseError> {
        let query = self.parse_select_statement()?;
        self.eat(&TokenKind::Semicolon);
        if !self.current.is_eof() {
            return Err(self.unexpected("end of input"));
        }
        Ok(query)
    }

    fn parse_select_statement(&mut self) -> Result<SelectStatement, ParseError> {
        self.expect_keyword(Keyword::Select)?;
        let distinct = self.eat_keyword(Keyword::Distinct);
        if !distinct {
            self.eat_keyword(Keyword::All);
        }

        let columns = self.comma_separated(|p| {
            let expr = p.parse_expression(0)?;
            let alias = p.parse_optional_alias()?;
            Ok(SelectColumn { expr, alias })
        })?;

        // Optional: paths in the other clauses import their root table.
        let from = if self.eat_keyword(Keyword::From) {
            self.parse_from_list()?
        } else {
            Vec::new()
        };
        let where_clause = self.parse_optional_clause(Keyword::Where)?;
        let group_by = if self.eat_keyword_pair(Keyword::Group, Keyword::By)? {
            self.comma_separated(|p| p.parse_expression(0))?
        } else {
            Vec::new()
        };
        let having = self.parse_optional_clause(Keyword::Having)?;
        let order_by = if self.eat_keyword_pair(Keyword::Order, Keyword::By)? {
            self.comma_separated(Self::parse_order_term)?
        } else {
            Vec::new()
        };
        let limit = self.parse_optional_clause(Keyword::Limit)?;
        let offset = self.parse_optional_clause(Keyword::Offset)?;

        Ok(SelectStatement {
            distinct,
            columns,
            from,
            where_clause,
            group_by,
            having,
            order_by,
            limit,
            offset,
        })
    }

    /// `<keyword> <expr>`, if the keyword is next.
    fn parse_optional_clause(&mut self, keyword: Keyword) -> Result<Option<Expr>, ParseError> {
        if self.eat_keyword(keyword) {
            self.parse_expression(0).map(Some)
        } else {
            Ok(None)
        }
    }

    fn parse_from_list(&mut self) -> Result<Vec<FromItem>, ParseError> {
        let mut items = vec![FromItem::new(self.parse_table_ref()?)];
        loop {
            if self.eat(&TokenKind::Comma) {
                items.push(FromItem::new(self.parse_table_ref()?));
            } else if let Some(join_type) = self.parse_join_type()? {
                let table = self.parse_table_ref()?;
                let (on, using) = self.parse_join_condition(join_type)?;
                items.push(FromItem::joined(
                    table,
                    JoinClause {
                        join_type,
                        on,
                        using,
                    },
                ));
            } else {
                return Ok(items);
            }
        }
    }

    /// A path such as `users` or `users.address`, or a derived table.
    fn parse_table_ref(&mut self) -> Result<TableRef, ParseError> {
        let open = self.current.span;
        if self.eat(&TokenKind::LeftParen) {
            let query = Box::new(self.parse_select_statement()?);
            self.expect(&TokenKind::RightParen)?;
            let alias = self
                .parse_optional_alias()?
                .ok_or_else(|| ParseError::new("Derived table requires an alias", open))?;
            return Ok(TableRef::Subquery { query, alias });
        }

        let mut path = vec![self.expect_identifier()?];
        while self.eat(&TokenKind::Dot) {
            path.push(self.expect_segment()?);
        }
        let alias = self.parse_optional_alias()?;
        Ok(TableRef::Table { path, alias })
    }

    /// Reads `[INNER | LEFT [OUTER] | RIGHT [OUTER] | FULL [OUTER] | CROSS] JOIN`.
    /// Returns `None` when no join starts here.
    fn parse_join_type(&mut self) -> Result<Option<JoinType>, ParseError> {
        let join_type = match self.current.kind {
            TokenKind::Keyword(Keyword::Join) => {
                self.advance();
                return Ok(Some(JoinType::Inner));
            }
            TokenKind::Keyword(Keyword::Inner) => JoinType::Inner,
            TokenKind::Keyword(Keyword::Left) => JoinType::Left,
            TokenKind::Keyword(Keyword::Right) => JoinType::Right,
            TokenKind::Keyword(Keyword::Full) => JoinType::Full,
            TokenKind::Keyword(Keyword::Cross) => JoinType::Cross,
            _ => return Ok(None),
        };
        self.advance();
        if matches!(join_type, JoinType::Left | JoinType::Right | JoinType::Full) {
            self.eat_keyword(Keyword::Outer);
        }
        self.expect_keyword(Keyword::Join)?;
        Ok(Some(join_type))
    }

    fn parse_join_condition(
        &mut self,
        join_type: JoinType,
    ) -> Result<(Option<Expr>, Vec<String>), ParseError> {
        if join_type == JoinType::Cross {
            return Ok((None, Vec::new()));
        }
        if self.eat_keyword(Keyword::On) {
            return Ok((Some(self.parse_expression(0)?), Vec::new()));
        }
        if self.eat_keyword(Keyword::Using) {
            self.expect(&TokenKind::LeftParen)?;
            let columns = self.comma_separated(Self::expect_identifier)?;
            self.expect(&TokenKind::RightParen)?;
            return Ok((None, columns));
        }
        // No condition: an auto-join, or a plain cross product.
        Ok((None, Vec::new()))
    }

    /// `AS name` or a bare name.
    fn parse_optional_alias(&mut self) -> Result<Option<String>, ParseError> {
        if self.eat_keyword(Keyword::As) || matches!(self.current.kind, TokenKind::Identifier(_)) {
            self.expect_identifier().map(Some)
        } else {
            Ok(None)
        }
    }

    fn parse_order_term(&mut self) -> Result<OrderBy, ParseError> {
        let expr = self.parse_expression(0)?;
        let direction = if self.eat_keyword(Keyword::Desc) {
            Some(OrderDirection::Desc)
        } else if self.eat_keyword(Keyword::Asc) {
            Some(OrderDirection::Asc)
        } else {
            None
        };
        let nulls = if self.eat_keyword(Keyword::Nulls) {
            if self.eat_keyword(Keyword::First) {
                Some(NullOrdering::First)
            } else {
                self.expect_keyword(Keyword::Last)?;
                Some(NullOrdering::Last)
            }
        } else {
            None
        };
        Ok(OrderBy {
            expr,
            direction,
            nulls,
        })
    }

    /// Parses an expression whose operators bind at least as tightly as
    /// `min_bp`.
    fn parse_expression(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = match prefix(&self.current.kind) {
            Some((op, bp)) => {
                self.advance();
                Expr::Unary {
                    op,
                    operand: Box::new(self.parse_expression(bp)?),
                }
            }
            None => self.parse_primary()?,
        };

        while let Some(mut infix) = Infix::at(&self.current.kind) {
            let (l_bp, r_bp) = infix.binding_power();
            if l_bp < min_bp {
                break;
            }

            let negated = infix == Infix::Not;
            if negated {
                // A NOT that starts no NOT IN/BETWEEN/LIKE ends the operand.
                match Infix::at(&self.peek_kind()) {
                    Some(next @ (Infix::In | Infix::Between | Infix::Binary(BinaryOp::Like))) => {
                        infix = next;
                    }
                    _ => break,
                }
                self.advance();
            }
            self.advance();

            lhs = match infix {
                Infix::Is => {
                    let negated = self.eat_keyword(Keyword::Not);
                    self.expect_keyword(Keyword::Null)?;
                    Expr::IsNull {
                        expr: Box::new(lhs),
                        negated,
                    }
                }
                Infix::In => {
                    self.expect(&TokenKind::LeftParen)?;
                    let membership = if self.check_keyword(Keyword::Select) {
                        Expr::InSubquery {
                            expr: Box::new(lhs),
                            query: Box::new(self.parse_select_statement()?),
                            negated,
                        }
                    } else {
                        Expr::In {
                            expr: Box::new(lhs),
                            list: self.comma_separated(|p| p.parse_expression(0))?,
                            negated,
                        }
                    };
                    self.expect(&TokenKind::RightParen)?;
                    membership
                }
                Infix::Between => {
                    let low = Box::new(self.parse_expression(r_bp)?);
                    self.expect_keyword(Keyword::And)?;
                    let high = Box::new(self.parse_expression(r_bp)?);
                    Expr::Between {
                        expr: Box::new(lhs),
                        low,
                        high,
                        negated,
                    }
                }
                Infix::Binary(op) => Expr::Binary {
                    left: Box::new(lhs),
                    op: if negated { BinaryOp::NotLike } else { op },
                    right: Box::new(self.parse_expression(r_bp)?),
                },
                Infix::Not => break,
            };
        }

        Ok(lhs)
    }

    fn literal(&self) -> Option<Literal> {
        Some(match &self.current.kind {
            TokenKind::Integer(n) => Literal::Integer(*n),
            TokenKind::Float(x) => Literal::Float(*x),
            TokenKind::String(s) => Literal::String(s.clone()),
            TokenKind::Keyword(Keyword::True) => Literal::Boolean(true),
            TokenKind::Keyword(Keyword::False) => Literal::Boolean(false),
            TokenKind::Keyword(Keyword::Null) => Literal::Null,
            _ => return None,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        if let Some(literal) = self.literal() {
            self.advance();
            return Ok(Expr::Literal(literal));
        }

        let token = self.current.clone();
        match token.kind {
            TokenKind::Question => {
                self.advance();
                self.param_counter += 1;
                Ok(Expr::Parameter {
                    name: None,
                    position: self.param_counter,
                })
            }
            TokenKind::Colon => {
                self.advance();
                Ok(Expr::Parameter {
                    name: Some(self.expect_identifier()?),
                    position: 0,
                })
            }
            TokenKind::Star => {
                self.advance();
                Ok(Expr::Wildcard { qualifier: None })
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = if self.check_keyword(Keyword::Select) {
                    Expr::Subquery(Box::new(self.parse_select_statement()?))
                } else {
                    Expr::Paren(Box::new(self.parse_expression(0)?))
                };
                self.expect(&TokenKind::RightParen)?;
                Ok(inner)
            }
            TokenKind::Keyword(Keyword::Cast) => {
                self.advance();
                self.parse_cast()
            }
            TokenKind::Keyword(Keyword::Case) => {
                self.advance();
                self.parse_case()
            }
            TokenKind::Keyword(Keyword::Exists) => {
                self.advance();
                self.expect(&TokenKind::LeftParen)?;
                let query = Box::new(self.parse_select_statement()?);
                self.expect(&TokenKind::RightParen)?;
                Ok(Expr::Exists(query))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.check(&TokenKind::LeftParen) {
                    self.parse_function_call(name)
                } else {
                    self.parse_column_path(name, token.span)
                }
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Parses the rest of `a.b.c.column` or `a.b.*` after its first segment.
    fn parse_column_path(&mut self, first: String, mut span: Span) -> Result<Expr, ParseError> {
        let mut segments = vec![first];
        while self.eat(&TokenKind::Dot) {
            if self.eat(&TokenKind::Star) {
                return Ok(Expr::Wildcard {
                    qualifier: Some(Qualifier::Path(segments)),
                });
            }
            segments.push(self.expect_segment()?);
            span = span.merge(self.previous.span);
        }

        // `segments` is never empty: it starts with `first`.
        let name = segments.pop().unwrap_or_default();
        let qualifier = (!segments.is_empty()).then_some(Qualifier::Path(segments));
        Ok(Expr::Column {
            qualifier,
            name,
            span,
        })
    }

    fn parse_function_call(&mut self, name: String) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let distinct = self.eat_keyword(Keyword::Distinct);
        let args = if self.check(&TokenKind::RightParen) {
            Vec::new()
        } else {
            self.comma_separated(|p| p.parse_expression(0))?
        };
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::Function(FunctionCall {
            name,
            args,
            distinct,
        }))
    }

    /// The rest of `CAST(expr AS type)`.
    fn parse_cast(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let expr = Box::new(self.parse_expression(0)?);
        self.expect_keyword(Keyword::As)?;
        let data_type = self.parse_data_type()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::Cast { expr, data_type })
    }

    /// The rest of `CASE [operand] WHEN .. THEN .. [ELSE ..] END`.
    fn parse_case(&mut self) -> Result<Expr, ParseError> {
        let operand = if self.check_keyword(Keyword::When) {
            None
        } else {
            Some(Box::new(self.parse_expression(0)?))
        };

        let mut when_clauses = Vec::new();
        while self.eat_keyword(Keyword::When) {
            let condition = self.parse_expression(0)?;
            self.expect_keyword(Keyword::Then)?;
            when_clauses.push((condition, self.parse_expression(0)?));
        }
        if when_clauses.is_empty() {
            return Err(self.unexpected("WHEN"));
        }

        let else_clause = self.parse_optional_clause(Keyword::Else)?.map(Box::new);
        self.expect_keyword(Keyword::End)?;
        Ok(Expr::Case {
            operand,
            when_clauses,
            else_clause,
        })
    }

    /// `TEXT`, `VARCHAR(255)`, `DECIMAL(10, 2)`.
    fn parse_data_type(&mut self) -> Result<DataType, ParseError> {
        let mut data_type = DataType::named(self.expect_identifier()?);
        if self.eat(&TokenKind::LeftParen) {
            data_type.params = self.comma_separated(Self::expect_unsigned)?;
            self.expect(&TokenKind::RightParen)?;
        }
        Ok(data_type)
    }

    fn expect_unsigned(&mut self) -> Result<u32, ParseError> {
        let TokenKind::Integer(n) = self.current.kind else {
            return Err(self.unexpected("integer"));
        };
        let value = u32::try_from(n)
            .map_err(|_| ParseError::new("Type parameter out of range", self.current.span))?;
        self.advance();
        Ok(value)
    }

    /// One or more `item`s separated by commas.
    fn comma_separated<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut items = vec![item(self)?];
        while self.eat(&TokenKind::Comma) {
            items.push(item(self)?);
        }
        Ok(items)
    }

    // --- Token cursor ---

    fn advance(&mut self) {
        self.previous = std::mem::replace(&mut self.current, self.lexer.next_token());
    }

    /// The kind of the token after the current one.
    fn peek_kind(&self) -> TokenKind {
        self.lexer.clone().next_token().kind
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current.kind == TokenKind::Keyword(keyword)
    }

    /// Consumes the current token if it is a `kind`.
    fn eat(&mut self, kind: &TokenKind) -> bool {
        let matched = self.check(kind);
        if matched {
            self.advance();
        }
        matched
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        let matched = self.check_keyword(keyword);
        if matched {
            self.advance();
        }
        matched
    }

    /// Consumes `first second` (`GROUP BY`, `ORDER BY`). Having `first`
    /// without `second` is an error.
    fn eat_keyword_pair(&mut self, first: Keyword, second: Keyword) -> Result<bool, ParseError> {
        if !self.eat_keyword(first) {
            return Ok(false);
        }
        self.expect_keyword(second)?;
        Ok(true)
    }

    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        ParseError::unexpected(expected, self.current.kind.clone(), self.current.span)
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(kind.to_string()))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword.as_str()))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        let TokenKind::Identifier(name) = &self.current.kind else {
            return Err(self.unexpected("identifier"));
        };
        let name = name.clone();
        self.advance();
        Ok(name)
    }

    /// Expects a path segment after a dot. Keywords are plain names there
    /// (`orders.order`), so they are taken as written.
    fn expect_segment(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Keyword(_) = self.current.kind {
            let text = String::from(self.lexer.slice(self.current.span));
            self.advance();
            return Ok(text);
        }
        self.expect_identifier()
    }
}
