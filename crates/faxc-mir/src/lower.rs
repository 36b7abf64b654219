//! HIR → MIR lowering: expression, statement, function, and module
//! lowering share one [`Lowerer`] per function, which wraps the
//! [`IrBuilder`] plus the scope bookkeeping lowering itself needs.
//!
//! Checked identifiers carry a scope depth but lowering doesn't reuse it
//! directly; instead each lowered scope (function body, block, branch)
//! pushes a fresh name table mapping the surface name to a mangled IR
//! name, mirroring exactly the push/pop nesting the analyzer already
//! performed to build the HIR. This keeps two same-named locals in
//! sibling/nested scopes (legal shadowing, per the symbol table contract)
//! from aliasing the same IR storage slot.

use crate::builder::IrBuilder;
use crate::ir::{BlockId, Constant, Function, IrType, Module, Opcode, Operand};
use faxc_par::{BinOp, LiteralValue, UnaryOp};
use faxc_sem::hir::{HirExpr, HirStmt};
use faxc_sem::Ty;
use faxc_util::{FxHashMap, Symbol};

fn ir_type_of(ty: Ty) -> IrType {
    match ty {
        Ty::None => IrType::Void,
        Ty::Bool | Ty::Tribool => IrType::Bool,
        Ty::Char | Ty::Character | Ty::String => IrType::String,
        Ty::Number | Ty::Byte | Ty::Word | Ty::Dword | Ty::Bit => IrType::Int,
        Ty::Object | Ty::Array | Ty::Tuple | Ty::Invalid => IrType::Void,
    }
}

fn parse_number_literal(lexeme: &str) -> Constant {
    if lexeme.contains('.') || lexeme.contains('e') || lexeme.contains('E') {
        Constant::Float(lexeme.parse().unwrap_or(0.0))
    } else {
        Constant::Int(lexeme.parse().unwrap_or(0))
    }
}

fn lower_literal(value: &LiteralValue) -> Constant {
    match value {
        LiteralValue::Number(sym) => parse_number_literal(sym.as_str()),
        LiteralValue::Str(sym) => Constant::Str(*sym),
        LiteralValue::Char(c) => Constant::Str(Symbol::intern(&c.to_string())),
        LiteralValue::Character(c) => Constant::Str(Symbol::intern(&c.to_string())),
        LiteralValue::Bool(b) => Constant::Bool(*b),
        LiteralValue::Null | LiteralValue::Unset => Constant::Int(0),
    }
}

/// Lowers a whole checked program into a [`Module`]. Top-level function
/// declarations each become an IR [`Function`]; any other top-level
/// statement (a bare variable declaration or expression) is collected
/// into a synthetic `main` function so every compiled unit has an entry
/// point — the original IR model only names "functions" as module
/// members, so top-level statements need *some* home (see `DESIGN.md`).
pub fn lower_program(hir: &[HirStmt]) -> Module {
    let mut module = Module::new();
    let mut top_level = Vec::new();
    for stmt in hir {
        if let HirStmt::FuncDecl { .. } = stmt {
            module.functions.push(lower_function(stmt));
        } else {
            top_level.push(stmt.clone());
        }
    }
    if !top_level.is_empty() {
        module.functions.push(lower_main(&top_level));
    }
    module
}

fn lower_main(stmts: &[HirStmt]) -> Function {
    let mut func = Function::new(Symbol::intern("main"), Vec::new(), IrType::Void);
    {
        let mut lowerer = Lowerer::new(&mut func);
        lowerer.push_scope();
        for stmt in stmts {
            lowerer.lower_stmt(stmt);
        }
        lowerer.pop_scope();
        if !lowerer.b.is_terminated() {
            lowerer.b.ret(None);
        }
    }
    func
}

fn lower_function(stmt: &HirStmt) -> Function {
    let HirStmt::FuncDecl { name, ret_ty, params, body } = stmt else {
        unreachable!("lower_function called on a non-function statement");
    };
    let ir_params: Vec<(Symbol, IrType)> = params.iter().map(|(s, ty)| (*s, ir_type_of(*ty))).collect();
    let mut func = Function::new(*name, ir_params.clone(), ir_type_of(*ret_ty));
    {
        let mut lowerer = Lowerer::new(&mut func);
        lowerer.push_scope();
        let mangled_params: Vec<Symbol> = ir_params.iter().map(|(p, _)| lowerer.define(*p)).collect();
        for (mangled, (_, ty)) in mangled_params.iter().zip(ir_params.iter()) {
            lowerer.b.push(Opcode::Alloca, vec![Operand::Variable(*mangled)], *ty);
            lowerer.b.push(
                Opcode::Store,
                vec![Operand::Variable(*mangled), Operand::Variable(*mangled)],
                IrType::Void,
            );
        }
        lowerer.lower_stmt(body);
        lowerer.pop_scope();
        if !lowerer.b.is_terminated() {
            lowerer.b.ret(None);
        }
    }
    func
}

/// `continue` jumps to a loop's header (to re-check the condition, or run
/// the increment first for a `for`); `break` jumps to its end block.
struct LoopTargets {
    continue_target: BlockId,
    break_target: BlockId,
}

struct Lowerer<'f> {
    b: IrBuilder<'f>,
    scopes: Vec<FxHashMap<Symbol, Symbol>>,
    loops: Vec<LoopTargets>,
    next_id: u32,
}

impl<'f> Lowerer<'f> {
    fn new(func: &'f mut Function) -> Self {
        Lowerer { b: IrBuilder::new(func), scopes: Vec::new(), loops: Vec::new(), next_id: 0 }
    }

    fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Binds `name` to a fresh mangled symbol in the innermost scope and
    /// returns it.
    fn define(&mut self, name: Symbol) -> Symbol {
        let mangled = Symbol::intern(&format!("{}${}", name.as_str(), self.next_id));
        self.next_id += 1;
        self.scopes.last_mut().expect("no active scope").insert(name, mangled);
        mangled
    }

    /// Resolves `name` to its mangled storage symbol, innermost scope
    /// first. Falls back to the plain name for anything lowering never
    /// saw declared in scope (function names referenced as call targets).
    fn resolve(&self, name: Symbol) -> Symbol {
        for scope in self.scopes.iter().rev() {
            if let Some(mangled) = scope.get(&name) {
                return *mangled;
            }
        }
        name
    }

    fn lower_stmt(&mut self, stmt: &HirStmt) {
        match stmt {
            HirStmt::Expr(e) => {
                self.lower_expr(e);
            }
            HirStmt::VarDecl { name, ty, initializer, .. } => {
                let mangled = self.define(*name);
                let ir_ty = ir_type_of(*ty);
                self.b.push(Opcode::Alloca, vec![Operand::Variable(mangled)], ir_ty);
                if let Some(init) = initializer {
                    let value = self.lower_expr(init);
                    self.b.push(Opcode::Store, vec![value, Operand::Variable(mangled)], IrType::Void);
                }
            }
            HirStmt::Block(stmts) => {
                self.push_scope();
                for s in stmts {
                    self.lower_stmt(s);
                }
                self.pop_scope();
            }
            HirStmt::If { condition, then_branch, else_branch } => {
                let cond = self.lower_expr(condition);
                let then_block = self.b.new_block();
                let else_block = self.b.new_block();
                let end_block = self.b.new_block();
                self.b.br(cond, then_block, else_block);

                self.b.switch_to_block(then_block);
                self.push_scope();
                self.lower_stmt(then_branch);
                self.pop_scope();
                self.b.jmp(end_block);

                self.b.switch_to_block(else_block);
                if let Some(else_branch) = else_branch {
                    self.push_scope();
                    self.lower_stmt(else_branch);
                    self.pop_scope();
                }
                self.b.jmp(end_block);

                self.b.switch_to_block(end_block);
            }
            HirStmt::While { condition, body } => {
                let header = self.b.new_block();
                let body_block = self.b.new_block();
                let end_block = self.b.new_block();
                self.b.jmp(header);

                self.b.switch_to_block(header);
                match condition {
                    Some(cond_expr) => {
                        let cond = self.lower_expr(cond_expr);
                        self.b.br(cond, body_block, end_block);
                    }
                    None => self.b.jmp(body_block),
                }

                self.b.switch_to_block(body_block);
                self.push_scope();
                self.loops.push(LoopTargets { continue_target: header, break_target: end_block });
                self.lower_stmt(body);
                self.loops.pop();
                self.pop_scope();
                self.b.jmp(header);

                self.b.switch_to_block(end_block);
            }
            HirStmt::For { init, condition, increment, body } => {
                self.push_scope();
                self.lower_stmt(init);

                let header = self.b.new_block();
                let body_block = self.b.new_block();
                let continue_block = self.b.new_block();
                let end_block = self.b.new_block();
                self.b.jmp(header);

                self.b.switch_to_block(header);
                match condition {
                    Some(cond_expr) => {
                        let cond = self.lower_expr(cond_expr);
                        self.b.br(cond, body_block, end_block);
                    }
                    None => self.b.jmp(body_block),
                }

                self.b.switch_to_block(body_block);
                self.push_scope();
                self.loops.push(LoopTargets { continue_target: continue_block, break_target: end_block });
                self.lower_stmt(body);
                self.loops.pop();
                self.pop_scope();
                self.b.jmp(continue_block);

                self.b.switch_to_block(continue_block);
                if let Some(inc) = increment {
                    self.lower_expr(inc);
                }
                self.b.jmp(header);

                self.b.switch_to_block(end_block);
                self.pop_scope();
            }
            HirStmt::FuncDecl { .. } => {
                // Local function declarations share the same lowering as
                // top-level ones but aren't modeled as nested IR
                // functions; nested function declarations inside a body
                // aren't produced by the checker today (see DESIGN.md).
            }
            HirStmt::Return { value, .. } => {
                let operand = value.as_ref().map(|v| self.lower_expr(v));
                self.b.ret(operand);
            }
            HirStmt::ClassDecl { members, .. } => {
                self.push_scope();
                for m in members {
                    self.lower_stmt(m);
                }
                self.pop_scope();
            }
            HirStmt::Break => {
                let target = self.loops.last().expect("break outside a loop (checker should reject this)").break_target;
                self.b.jmp(target);
            }
            HirStmt::Continue => {
                let target = self.loops.last().expect("continue outside a loop (checker should reject this)").continue_target;
                self.b.jmp(target);
            }
        }
    }

    fn lower_expr(&mut self, expr: &HirExpr) -> Operand {
        match expr {
            HirExpr::Literal { value, .. } => Operand::Constant(lower_literal(value)),
            HirExpr::Identifier { name, .. } => Operand::Variable(self.resolve(*name)),
            HirExpr::Binary { op, left, right, ty } => self.lower_binary(*op, left, right, *ty),
            HirExpr::Unary { op, operand, ty } => self.lower_unary(*op, operand, *ty),
            HirExpr::Assignment { name, value, .. } => {
                let v = self.lower_expr(value);
                let mangled = self.resolve(*name);
                self.b.push(Opcode::Store, vec![v.clone(), Operand::Variable(mangled)], IrType::Void);
                v
            }
            HirExpr::Call { callee, arguments, ty } => {
                let mut operands = vec![Operand::Variable(*callee)];
                for arg in arguments {
                    operands.push(self.lower_expr(arg));
                }
                Operand::Inst(self.b.push(Opcode::Call, operands, ir_type_of(*ty)))
            }
            HirExpr::Tuple { elements, .. } => {
                let mut last = Operand::Constant(Constant::Int(0));
                for e in elements {
                    last = self.lower_expr(e);
                }
                last
            }
            HirExpr::TupleMember { tuple, .. } => self.lower_expr(tuple),
        }
    }

    fn lower_binary(&mut self, op: BinOp, left: &HirExpr, right: &HirExpr, ty: Ty) -> Operand {
        match op {
            BinOp::And => return self.lower_short_circuit(left, right, true),
            BinOp::Or => return self.lower_short_circuit(left, right, false),
            _ => {}
        }
        let lhs = self.lower_expr(left);
        let rhs = self.lower_expr(right);
        let opcode = match op {
            BinOp::Add => Opcode::Add,
            BinOp::Sub => Opcode::Sub,
            BinOp::Mul => Opcode::Mul,
            BinOp::Div => Opcode::Div,
            BinOp::Mod => Opcode::Mod,
            BinOp::Eq => Opcode::Eq,
            BinOp::Ne => Opcode::Ne,
            BinOp::Lt => Opcode::Lt,
            BinOp::Le => Opcode::Le,
            BinOp::Gt => Opcode::Gt,
            BinOp::Ge => Opcode::Ge,
            BinOp::BitAnd => Opcode::And,
            BinOp::BitOr => Opcode::Or,
            BinOp::BitXor => Opcode::Xor,
            BinOp::Shl => Opcode::Shl,
            BinOp::Shr => Opcode::Shr,
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        };
        Operand::Inst(self.b.push(opcode, vec![lhs, rhs], ir_type_of(ty)))
    }

    /// `&&`/`||` lower to control flow with a phi-join rather than a
    /// plain boolean-opcode instruction, so the right operand is only
    /// ever evaluated when it can affect the result.
    fn lower_short_circuit(&mut self, left: &HirExpr, right: &HirExpr, is_and: bool) -> Operand {
        let lhs = self.lower_expr(left);
        let rhs_block = self.b.new_block();
        let end_block = self.b.new_block();
        let short_circuit_block = self.b.current_block();
        if is_and {
            self.b.br(lhs, rhs_block, end_block);
        } else {
            self.b.br(lhs, end_block, rhs_block);
        }

        self.b.switch_to_block(rhs_block);
        let rhs = self.lower_expr(right);
        let rhs_end_block = self.b.current_block();
        self.b.jmp(end_block);

        self.b.switch_to_block(end_block);
        let short_circuit_value = Operand::Constant(Constant::Bool(!is_and));
        Operand::Inst(self.b.push(
            Opcode::Phi,
            vec![
                short_circuit_value,
                Operand::Label(short_circuit_block),
                rhs,
                Operand::Label(rhs_end_block),
            ],
            IrType::Bool,
        ))
    }

    fn lower_unary(&mut self, op: UnaryOp, operand: &HirExpr, ty: Ty) -> Operand {
        let value = self.lower_expr(operand);
        let ir_ty = ir_type_of(ty);
        match op {
            UnaryOp::Neg => Operand::Inst(self.b.push(
                Opcode::Sub,
                vec![Operand::Constant(Constant::Int(0)), value],
                ir_ty,
            )),
            UnaryOp::Not | UnaryOp::BitNot => Operand::Inst(self.b.push(Opcode::Not, vec![value], ir_ty)),
        }
    }
}
