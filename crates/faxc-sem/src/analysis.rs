//! The semantic analyzer: scope/type/flow checking over a parsed program,
//! producing a checked tree ([`hir`]) alongside the collected errors.

use crate::error::SemanticError;
use crate::hir::{HirExpr, HirStmt};
use crate::scope::{ScopeKind, SymbolEntry, SymbolKind, SymbolTable};
use crate::types::*;
use faxc_lex::Token;
use faxc_par::*;
use faxc_util::Symbol;

/// At most this many errors are collected before further ones are
/// suppressed.
pub const MAX_ERRORS: usize = 100;

/// The outcome of [`SemanticAnalyzer::analyze`]: every error encountered,
/// in source order, plus the checked tree built alongside them.
#[derive(Debug, Default)]
pub struct AnalysisReport {
    pub errors: Vec<SemanticError>,
    pub hir: Vec<HirStmt>,
}

impl AnalysisReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Walks a parsed program, resolving names and checking types.
///
/// A `SemanticAnalyzer` is single-use: construct it, call [`analyze`],
/// and read back the report. The symbol table persists across every
/// statement so references made before and after an erroring statement
/// still resolve consistently.
///
/// [`analyze`]: SemanticAnalyzer::analyze
pub struct SemanticAnalyzer {
    symbols: SymbolTable,
    errors: Vec<SemanticError>,
    loop_depth: u32,
    /// `None` outside any function; `Some(ret_ty)` while checking one.
    current_return_type: Option<Ty>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        SemanticAnalyzer {
            symbols: SymbolTable::new(),
            errors: Vec::new(),
            loop_depth: 0,
            current_return_type: None,
        }
    }

    pub fn analyze(mut self, program: &[Stmt]) -> AnalysisReport {
        let hir = program.iter().map(|s| self.check_stmt(s)).collect();
        AnalysisReport { errors: self.errors, hir }
    }

    fn report(&mut self, message: impl Into<String>, token: &Token) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(SemanticError::new(message, token.line, token.column));
        }
    }

    // -- statements ------------------------------------------------------

    fn check_stmt(&mut self, stmt: &Stmt) -> HirStmt {
        match stmt {
            Stmt::Expr(s) => HirStmt::Expr(self.check_expr(&s.expr)),
            Stmt::VarDecl(s) => self.check_var_decl(s),
            Stmt::Block(s) => self.check_block(s),
            Stmt::If(s) => self.check_if(s),
            Stmt::While(s) => self.check_while(s),
            Stmt::For(s) => self.check_for(s),
            Stmt::FuncDecl(s) => self.check_func_decl(s),
            Stmt::Return(s) => self.check_return(s),
            Stmt::ClassDecl(s) => self.check_class_decl(s),
            Stmt::Break(s) => {
                if self.loop_depth == 0 {
                    self.report("break outside of a loop", &s.token);
                }
                HirStmt::Break
            }
            Stmt::Continue(s) => {
                if self.loop_depth == 0 {
                    self.report("continue outside of a loop", &s.token);
                }
                HirStmt::Continue
            }
        }
    }

    fn check_var_decl(&mut self, stmt: &VarDeclStmt) -> HirStmt {
        let declared_ty = Ty::from_ast(&stmt.ty);

        if self.symbols.is_defined_in_current_scope(stmt.name) {
            self.report(
                format!("'{}' is already defined in this scope", stmt.name.as_str()),
                &stmt.name_token,
            );
        }

        if stmt.is_const && stmt.initializer.is_none() {
            self.report(
                format!("const '{}' must have an initializer", stmt.name.as_str()),
                &stmt.name_token,
            );
        }

        let mut initialized = false;
        let mut hir_init = None;
        if let Some(init) = &stmt.initializer {
            let hir_expr = self.check_expr(init);
            let init_ty = hir_expr.ty();
            if init_ty != Ty::Invalid && declared_ty != Ty::Invalid && !can_implicit_convert(init_ty, declared_ty) {
                self.report(
                    format!(
                        "cannot initialize '{}' of type '{}' with a value of type '{}'",
                        stmt.name.as_str(),
                        declared_ty,
                        init_ty
                    ),
                    init.token(),
                );
            }
            initialized = true;
            hir_init = Some(hir_expr);
        }

        let depth = self.symbols.current_scope_level();
        let entry = SymbolEntry::variable(stmt.name, declared_ty, stmt.name_token, depth, stmt.is_const, initialized);
        // Ignore the duplicate-insert error: it was already reported above,
        // and leaving the latest declaration bound lets later references
        // keep resolving rather than spuriously becoming "undefined".
        let _ = self.symbols.define(entry);

        HirStmt::VarDecl {
            name: stmt.name,
            ty: declared_ty,
            is_const: stmt.is_const,
            initializer: hir_init,
        }
    }

    fn check_block(&mut self, stmt: &BlockStmt) -> HirStmt {
        self.symbols.begin_scope(ScopeKind::Block);
        let statements = stmt.statements.iter().map(|s| self.check_stmt(s)).collect();
        self.symbols.end_scope();
        HirStmt::Block(statements)
    }

    fn check_if(&mut self, stmt: &IfStmt) -> HirStmt {
        let condition = self.check_expr(&stmt.condition);
        if condition.ty() != Ty::Invalid && condition.ty() != Ty::Bool {
            self.report("if condition must be bool", stmt.condition.token());
        }
        self.symbols.begin_scope(ScopeKind::Block);
        let then_branch = Box::new(self.check_stmt(&stmt.then_branch));
        self.symbols.end_scope();
        let else_branch = if let Some(else_branch) = &stmt.else_branch {
            self.symbols.begin_scope(ScopeKind::Block);
            let hir = Box::new(self.check_stmt(else_branch));
            self.symbols.end_scope();
            Some(hir)
        } else {
            None
        };
        HirStmt::If {
            condition,
            then_branch,
            else_branch,
        }
    }

    fn check_while(&mut self, stmt: &WhileStmt) -> HirStmt {
        let condition = if let Some(cond) = &stmt.condition {
            let hir = self.check_expr(cond);
            if hir.ty() != Ty::Invalid && hir.ty() != Ty::Bool {
                self.report("while condition must be bool", cond.token());
            }
            Some(hir)
        } else {
            None
        };
        self.loop_depth += 1;
        self.symbols.begin_scope(ScopeKind::Block);
        let body = Box::new(self.check_stmt(&stmt.body));
        self.symbols.end_scope();
        self.loop_depth -= 1;
        HirStmt::While { condition, body }
    }

    fn check_for(&mut self, stmt: &ForStmt) -> HirStmt {
        self.symbols.begin_scope(ScopeKind::Block);
        let init = Box::new(match stmt.init.as_ref() {
            ForInit::VarDecl(v) => self.check_var_decl(v),
            ForInit::Expr(e) => HirStmt::Expr(self.check_expr(&e.expr)),
            ForInit::None => HirStmt::Block(Vec::new()),
        });
        let condition = if let Some(cond) = &stmt.condition {
            let hir = self.check_expr(cond);
            if hir.ty() != Ty::Invalid && hir.ty() != Ty::Bool {
                self.report("for condition must be bool", cond.token());
            }
            Some(hir)
        } else {
            None
        };
        let increment = stmt.increment.as_ref().map(|inc| self.check_expr(inc));
        self.loop_depth += 1;
        self.symbols.begin_scope(ScopeKind::Block);
        let body = Box::new(self.check_stmt(&stmt.body));
        self.symbols.end_scope();
        self.loop_depth -= 1;
        self.symbols.end_scope();
        HirStmt::For {
            init,
            condition,
            increment,
            body,
        }
    }

    fn check_func_decl(&mut self, stmt: &FuncDeclStmt) -> HirStmt {
        let ret_ty = Ty::from_ast(&stmt.ret_type);

        if self.symbols.is_defined_in_current_scope(stmt.name) {
            self.report(
                format!("function '{}' is already defined in this scope", stmt.name.as_str()),
                &stmt.name_token,
            );
        }

        let mut seen_params: Vec<Symbol> = Vec::new();
        for param in &stmt.params {
            if seen_params.contains(&param.name) {
                self.report(
                    format!("duplicate parameter name '{}'", param.name.as_str()),
                    &param.name_token,
                );
            } else {
                seen_params.push(param.name);
            }
        }

        let depth = self.symbols.current_scope_level();
        let param_tys: Vec<Ty> = stmt.params.iter().map(|p| Ty::from_ast(&p.ty)).collect();
        let entry = SymbolEntry::function(stmt.name, ret_ty, stmt.name_token, depth, param_tys.clone());
        let _ = self.symbols.define(entry);

        let saved_ret = self.current_return_type.replace(ret_ty);
        let saved_loop_depth = std::mem::replace(&mut self.loop_depth, 0);

        self.symbols.begin_scope(ScopeKind::Function);
        for (param, ty) in stmt.params.iter().zip(param_tys.iter()) {
            let pdepth = self.symbols.current_scope_level();
            let _ = self
                .symbols
                .define(SymbolEntry::parameter(param.name, *ty, param.name_token, pdepth));
        }
        let body = Box::new(self.check_block(&stmt.body));
        self.symbols.end_scope();

        self.loop_depth = saved_loop_depth;
        self.current_return_type = saved_ret;

        HirStmt::FuncDecl {
            name: stmt.name,
            ret_ty,
            params: stmt.params.iter().zip(param_tys).map(|(p, ty)| (p.name, ty)).collect(),
            body,
        }
    }

    fn check_return(&mut self, stmt: &ReturnStmt) -> HirStmt {
        let Some(ret_ty) = self.current_return_type else {
            self.report("return outside of a function", &stmt.return_token);
            let value = stmt.value.as_ref().map(|v| self.check_expr(v));
            return HirStmt::Return { value, ret_ty: Ty::Invalid };
        };

        let value = match (&stmt.value, ret_ty) {
            (Some(value), Ty::None) => {
                let hir = self.check_expr(value);
                self.report("cannot return a value from a function with no return type", value.token());
                Some(hir)
            }
            (None, Ty::None) => None,
            (None, _) => {
                self.report("missing return value", &stmt.return_token);
                None
            }
            (Some(value), _) => {
                let hir = self.check_expr(value);
                if hir.ty() != Ty::Invalid && !is_compatible_type(hir.ty(), ret_ty) {
                    self.report(
                        format!("cannot return '{}' from a function returning '{}'", hir.ty(), ret_ty),
                        value.token(),
                    );
                }
                Some(hir)
            }
        };
        HirStmt::Return { value, ret_ty }
    }

    fn check_class_decl(&mut self, stmt: &ClassDeclStmt) -> HirStmt {
        if self.symbols.is_defined_in_current_scope(stmt.name) {
            self.report(
                format!("'{}' is already defined in this scope", stmt.name.as_str()),
                &stmt.name_token,
            );
        }
        let depth = self.symbols.current_scope_level();
        let _ = self.symbols.define(SymbolEntry::variable(
            stmt.name,
            Ty::Object,
            stmt.name_token,
            depth,
            true,
            true,
        ));
        self.symbols.begin_scope(ScopeKind::Block);
        let members = stmt.members.iter().map(|m| self.check_stmt(m)).collect();
        self.symbols.end_scope();
        HirStmt::ClassDecl { name: stmt.name, members }
    }

    // -- expressions -------------------------------------------------------

    fn check_expr(&mut self, expr: &Expr) -> HirExpr {
        match expr {
            Expr::Literal(e) => self.check_literal(e),
            Expr::Identifier(e) => self.check_identifier(e),
            Expr::Binary(e) => self.check_binary(e),
            Expr::Unary(e) => self.check_unary(e),
            Expr::Assignment(e) => self.check_assignment(e),
            Expr::Call(e) => self.check_call(e),
            Expr::Tuple(e) => self.check_tuple(e),
            Expr::TupleMember(e) => self.check_tuple_member(e),
        }
    }

    fn check_literal(&mut self, expr: &LiteralExpr) -> HirExpr {
        let ty = match &expr.value {
            LiteralValue::Number(_) => Ty::Number,
            LiteralValue::Str(_) => Ty::String,
            LiteralValue::Char(_) => Ty::Char,
            LiteralValue::Character(_) => Ty::Character,
            LiteralValue::Bool(_) => Ty::Bool,
            LiteralValue::Null | LiteralValue::Unset => Ty::None,
        };
        HirExpr::Literal { value: expr.value.clone(), ty }
    }

    fn check_identifier(&mut self, expr: &IdentifierExpr) -> HirExpr {
        let Some((ty, depth, is_initialized)) = self
            .symbols
            .resolve_variable(expr.name)
            .map(|entry| (entry.ty, entry.scope_depth, entry.is_initialized))
        else {
            self.report(format!("undefined name '{}'", expr.name.as_str()), &expr.token);
            return HirExpr::Identifier {
                name: expr.name,
                ty: Ty::Invalid,
                depth: None,
            };
        };
        if !is_initialized {
            self.report(
                format!("'{}' is used before being initialized", expr.name.as_str()),
                &expr.token,
            );
        }
        HirExpr::Identifier {
            name: expr.name,
            ty,
            depth: Some(depth),
        }
    }

    fn check_binary(&mut self, expr: &BinaryExpr) -> HirExpr {
        let left = self.check_expr(&expr.left);
        let right = self.check_expr(&expr.right);
        let (lhs, rhs) = (left.ty(), right.ty());
        if lhs == Ty::Invalid || rhs == Ty::Invalid {
            return HirExpr::Binary {
                op: expr.op,
                left: Box::new(left),
                right: Box::new(right),
                ty: Ty::Invalid,
            };
        }

        let ty = match expr.op {
            BinOp::Add => {
                if lhs == Ty::String || rhs == Ty::String {
                    if is_string_convertible(lhs) && is_string_convertible(rhs) {
                        Ty::String
                    } else {
                        self.report("'+' requires string-convertible operands", &expr.op_token);
                        Ty::Invalid
                    }
                } else if is_numeric_convertible(lhs) && is_numeric_convertible(rhs) {
                    common_type(lhs, rhs)
                } else {
                    self.report("'+' requires numeric or string-convertible operands", &expr.op_token);
                    Ty::Invalid
                }
            }
            BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                if is_numeric_convertible(lhs) && is_numeric_convertible(rhs) {
                    common_type(lhs, rhs)
                } else {
                    self.report("arithmetic operator requires numeric operands", &expr.op_token);
                    Ty::Invalid
                }
            }
            BinOp::Eq | BinOp::Ne => {
                if is_comparable_type(lhs, rhs) {
                    Ty::Bool
                } else {
                    self.report(format!("cannot compare '{}' with '{}'", lhs, rhs), &expr.op_token);
                    Ty::Invalid
                }
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                if is_ordered_type(lhs) && is_ordered_type(rhs) && is_compatible_type(lhs, rhs) {
                    Ty::Bool
                } else {
                    self.report(format!("cannot order '{}' against '{}'", lhs, rhs), &expr.op_token);
                    Ty::Invalid
                }
            }
            BinOp::And | BinOp::Or => {
                if lhs == Ty::Bool && rhs == Ty::Bool {
                    Ty::Bool
                } else {
                    self.report("logical operator requires bool operands", &expr.op_token);
                    Ty::Invalid
                }
            }
            BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor => {
                if is_bit_type(lhs) && is_bit_type(rhs) && is_compatible_type(lhs, rhs) {
                    lhs
                } else {
                    self.report("bitwise operator requires matching bit-width operands", &expr.op_token);
                    Ty::Invalid
                }
            }
            BinOp::Shl | BinOp::Shr => {
                if is_bit_type(lhs) && is_numeric_convertible(rhs) {
                    lhs
                } else {
                    self.report("shift requires a bit-type left operand and numeric right operand", &expr.op_token);
                    Ty::Invalid
                }
            }
        };
        HirExpr::Binary {
            op: expr.op,
            left: Box::new(left),
            right: Box::new(right),
            ty,
        }
    }

    fn check_unary(&mut self, expr: &UnaryExpr) -> HirExpr {
        let operand = self.check_expr(&expr.operand);
        if operand.ty() == Ty::Invalid {
            return HirExpr::Unary {
                op: expr.op,
                operand: Box::new(operand),
                ty: Ty::Invalid,
            };
        }
        let operand_ty = operand.ty();
        let ty = match expr.op {
            UnaryOp::Neg => {
                if is_numeric_type(operand_ty) {
                    Ty::Number
                } else {
                    self.report("unary '-' requires a numeric operand", &expr.op_token);
                    Ty::Invalid
                }
            }
            UnaryOp::Not => {
                if operand_ty == Ty::Bool {
                    Ty::Bool
                } else {
                    self.report("unary '!' requires a bool operand", &expr.op_token);
                    Ty::Invalid
                }
            }
            UnaryOp::BitNot => {
                if is_bit_type(operand_ty) {
                    operand_ty
                } else {
                    self.report("unary '~' requires a bit-type operand", &expr.op_token);
                    Ty::Invalid
                }
            }
        };
        HirExpr::Unary {
            op: expr.op,
            operand: Box::new(operand),
            ty,
        }
    }

    fn check_assignment(&mut self, expr: &AssignmentExpr) -> HirExpr {
        let value = self.check_expr(&expr.value);
        let value_ty = value.ty();

        // Pull out everything needed from the resolved entry up front: the
        // immutable borrow can't stay alive across the `&mut self` calls to
        // `report` below.
        let resolved = self
            .symbols
            .resolve_variable(expr.name)
            .map(|entry| (entry.kind, entry.ty, entry.is_constant));

        let Some((kind, declared_ty, is_constant)) = resolved else {
            if self.symbols.resolve(expr.name).is_some() {
                self.report(
                    format!("cannot assign to '{}': not a variable", expr.name.as_str()),
                    &expr.target_token,
                );
            } else {
                self.report(format!("undefined name '{}'", expr.name.as_str()), &expr.target_token);
            }
            return HirExpr::Assignment {
                name: expr.name,
                value: Box::new(value),
                ty: Ty::Invalid,
            };
        };

        if kind != SymbolKind::Variable && kind != SymbolKind::Parameter {
            self.report(
                format!("cannot assign to '{}': not a variable", expr.name.as_str()),
                &expr.target_token,
            );
            return HirExpr::Assignment {
                name: expr.name,
                value: Box::new(value),
                ty: Ty::Invalid,
            };
        }
        if is_constant {
            self.report(
                format!("cannot assign to constant '{}'", expr.name.as_str()),
                &expr.target_token,
            );
            return HirExpr::Assignment {
                name: expr.name,
                value: Box::new(value),
                ty: declared_ty,
            };
        }
        if value_ty != Ty::Invalid && !is_compatible_type(declared_ty, value_ty) {
            self.report(
                format!("cannot assign '{}' to '{}' of type '{}'", value_ty, expr.name.as_str(), declared_ty),
                &expr.target_token,
            );
        }

        if let Some(entry) = self.symbols.resolve_variable_mut(expr.name) {
            entry.is_initialized = true;
            entry.is_modified = true;
        }
        HirExpr::Assignment {
            name: expr.name,
            value: Box::new(value),
            ty: declared_ty,
        }
    }

    fn check_call(&mut self, expr: &CallExpr) -> HirExpr {
        let Expr::Identifier(callee) = expr.callee.as_ref() else {
            self.report("call target must be a named function", &expr.paren_token);
            let arguments = expr.arguments.iter().map(|a| self.check_expr(a)).collect();
            return HirExpr::Call {
                callee: Symbol::intern(""),
                arguments,
                ty: Ty::Invalid,
            };
        };

        let Some(entry) = self.symbols.resolve(callee.name) else {
            self.report(format!("undefined function '{}'", callee.name.as_str()), &callee.token);
            let arguments = expr.arguments.iter().map(|a| self.check_expr(a)).collect();
            return HirExpr::Call {
                callee: callee.name,
                arguments,
                ty: Ty::Invalid,
            };
        };
        if entry.kind != SymbolKind::Function {
            self.report(format!("'{}' is not callable", callee.name.as_str()), &callee.token);
            let arguments = expr.arguments.iter().map(|a| self.check_expr(a)).collect();
            return HirExpr::Call {
                callee: callee.name,
                arguments,
                ty: Ty::Invalid,
            };
        }

        let params = entry.params.clone();
        let ret_ty = entry.ret_ty;
        if params.len() != expr.arguments.len() {
            self.report(
                format!(
                    "'{}' expects {} argument(s), found {}",
                    callee.name.as_str(),
                    params.len(),
                    expr.arguments.len()
                ),
                &expr.paren_token,
            );
        }
        let mut arguments = Vec::with_capacity(expr.arguments.len());
        for (arg, param_ty) in expr.arguments.iter().zip(params.iter()) {
            let hir = self.check_expr(arg);
            if hir.ty() != Ty::Invalid && !is_compatible_type(hir.ty(), *param_ty) {
                self.report(
                    format!("argument of type '{}' is not compatible with parameter of type '{}'", hir.ty(), param_ty),
                    arg.token(),
                );
            }
            arguments.push(hir);
        }
        for extra in expr.arguments.iter().skip(params.len()) {
            arguments.push(self.check_expr(extra));
        }
        HirExpr::Call {
            callee: callee.name,
            arguments,
            ty: ret_ty,
        }
    }

    fn check_tuple(&mut self, expr: &TupleExpr) -> HirExpr {
        let elements = expr.elements.iter().map(|e| self.check_expr(e)).collect();
        HirExpr::Tuple { elements, ty: Ty::Tuple }
    }

    fn check_tuple_member(&mut self, expr: &TupleMemberExpr) -> HirExpr {
        // Element-wise tuple types aren't tracked; `Number` is used as a
        // permissive placeholder so member access never itself becomes the
        // origin of a cascading type error.
        let tuple = self.check_expr(&expr.tuple);
        HirExpr::TupleMember {
            tuple: Box::new(tuple),
            index: expr.index,
            ty: Ty::Number,
        }
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
