use std::{
    io,
    path::{Path, PathBuf},
    rc::Rc,
};

use log::debug;

use crate::{
    common::{
        manifest::Config,
        module::{self, FsLoader, Loader},
        source::Source,
        span::{Span, Spanned},
    },
    compiler::{
        cursor::Cursor,
        expand::MacroTable,
        lex::Lexer,
        parse::Parser,
        syntax::{ErrorKind, Note, Syntax},
        table::{Grammar, TransitionTable},
    },
    construct::{token::Tokens, tree::IrBlock},
};

fn unreadable(path: &Path, error: &io::Error) -> String {
    match error.kind() {
        io::ErrorKind::NotFound => format!("File `{}` was not found", path.display()),
        _ => format!("File `{}` could not be read: {}", path.display(), error),
    }
}

/// Everything that lives for exactly one compile:
/// the macros declared so far, the collaborators used to scan and load
/// files, the chain of files currently being included, and how deeply
/// the expression being parsed is nested.
/// One session compiles one root file and everything it `use`s.
pub struct Session {
    macros:    MacroTable,
    table:     Box<dyn TransitionTable>,
    loader:    Box<dyn Loader>,
    config:    Config,
    including: Vec<PathBuf>,
    nesting:   usize,
}

impl Default for Session {
    fn default() -> Session { Session::new() }
}

impl Session {
    /// A session that scans with the default grammar and reads
    /// included files from disk.
    pub fn new() -> Session {
        Session {
            macros:    MacroTable::new(),
            table:     Box::new(Grammar::default()),
            loader:    Box::new(FsLoader),
            config:    Config::default(),
            including: vec![],
            nesting:   0,
        }
    }

    pub fn with_loader(mut self, loader: impl Loader + 'static) -> Session {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_table(mut self, table: impl TransitionTable + 'static) -> Session {
        self.table = Box::new(table);
        self
    }

    pub fn with_config(mut self, config: Config) -> Session {
        self.config = config;
        self
    }

    /// Every macro declared so far, across all files compiled
    /// in this session.
    pub fn macros(&self) -> &MacroTable { &self.macros }

    pub(crate) fn macros_mut(&mut self) -> &mut MacroTable { &mut self.macros }

    pub fn config(&self) -> &Config { &self.config }

    /// Enters one more level of expression nesting.
    /// Returns false, without entering, once the configured limit is hit.
    /// The count carries across included files.
    pub(crate) fn nest(&mut self) -> bool {
        if self.nesting >= self.config.max_nesting_depth {
            return false;
        }
        self.nesting += 1;
        true
    }

    pub(crate) fn unnest(&mut self) { self.nesting = self.nesting.saturating_sub(1); }

    /// Scans a source without parsing it.
    pub fn lex(&self, source: Rc<Source>) -> Result<Spanned<Tokens>, Syntax> {
        Lexer::lex(source, self.table.as_ref())
    }

    /// Compiles a root file into its top-level block.
    /// Macros declared along the way stay in the session.
    pub fn compile(&mut self, source: Rc<Source>) -> Result<IrBlock, Syntax> {
        self.including.push(module::normalize(&source.path));
        let result = self.parse_file(source);
        self.including.pop();
        result
    }

    /// Loads the root file through the session's loader, then compiles it.
    pub fn compile_path(&mut self, path: &Path) -> Result<IrBlock, Syntax> {
        let source = self
            .loader
            .load(path)
            .map_err(|e| Syntax::error_no_note(ErrorKind::Io, &unreadable(path, &e)))?;

        self.compile(source)
    }

    /// Compiles the file a `use` form in `including` names, resolved
    /// against the directory of `including`.
    /// `span` is the path literal, used to point at the offending form.
    pub fn include(
        &mut self,
        including: &Rc<Source>,
        relative: &str,
        span: &Span,
    ) -> Result<IrBlock, Syntax> {
        let path = module::resolve(including, relative);

        if self.including.len() > self.config.max_include_depth {
            return Err(Syntax::error_with_note(
                ErrorKind::Io,
                &format!(
                    "Inclusion of `{}` nests more than {} files deep",
                    path.display(),
                    self.config.max_include_depth
                ),
                Note::new_with_hint(
                    "raise `max-include-depth` in the manifest if this is intended",
                    span,
                ),
            ));
        }

        if self.including.contains(&path) {
            return Err(Syntax::error(
                ErrorKind::Io,
                &format!("File `{}` includes itself", path.display()),
                span,
            ));
        }

        let source = self
            .loader
            .load(&path)
            .map_err(|e| Syntax::error(ErrorKind::Io, &unreadable(&path, &e), span))?;

        debug!(
            "including {} from {}",
            path.display(),
            including.path.display()
        );

        self.including.push(path);
        let result = self.parse_file(source);
        self.including.pop();
        result
    }

    /// Scans and parses one file with its own cursor.
    fn parse_file(&mut self, source: Rc<Source>) -> Result<IrBlock, Syntax> {
        let tokens = self.lex(source)?;
        Parser::parse(Cursor::new(tokens), self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        common::module::MemoryLoader,
        construct::{
            token::TokenKind,
            tree::{print_block, IrExpr},
        },
    };

    fn session(loader: MemoryLoader) -> Session { Session::new().with_loader(loader) }

    #[test]
    fn compiles_root_from_loader() {
        let loader = MemoryLoader::new().with("main.ae", "(f 1)");
        let ir = session(loader).compile_path(Path::new("main.ae")).unwrap();
        assert_eq!(ir, vec![IrExpr::call("f", vec![IrExpr::Int(1)])]);
    }

    #[test]
    fn missing_root() {
        let error = session(MemoryLoader::new())
            .compile_path(Path::new("main.ae"))
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Io);
        assert_eq!(error.reason, "File `main.ae` was not found");
    }

    #[test]
    fn include_is_relative_to_including_file() {
        let loader = MemoryLoader::new()
            .with("a/b.ae", "(use \"c.ae\") (g)")
            .with("a/c.ae", "(f 1)")
            .with("c.ae", "(wrong)");

        let ir = session(loader).compile_path(Path::new("a/b.ae")).unwrap();
        assert_eq!(print_block(&ir), "(block (f 1)) (g)");
    }

    #[test]
    fn missing_include_names_resolved_path() {
        let loader = MemoryLoader::new().with("a/b.ae", "(use \"c.ae\")");
        let error = session(loader).compile_path(Path::new("a/b.ae")).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Io);
        assert_eq!(error.reason, "File `a/c.ae` was not found");
    }

    #[test]
    fn macros_cross_file_boundaries() {
        let loader = MemoryLoader::new()
            .with("lib/prelude.ae", "(macro twice [x] (f x x))")
            .with("main.ae", "(use \"lib/prelude.ae\") (!twice 3)");

        let mut session = session(loader);
        let ir = session.compile_path(Path::new("main.ae")).unwrap();
        assert_eq!(print_block(&ir), "(block) (block (f 3 3))");
        assert_eq!(session.macros().len(), 1);
    }

    #[test]
    fn outer_parse_resumes_after_include() {
        let loader = MemoryLoader::new()
            .with("main.ae", "(a) (use \"x.ae\") (b) (use \"x.ae\") (c)")
            .with("x.ae", "(x 1) (y 2) (z 3)");

        let ir = session(loader).compile_path(Path::new("main.ae")).unwrap();
        assert_eq!(
            print_block(&ir),
            "(a) (block (x 1) (y 2) (z 3)) (b) (block (x 1) (y 2) (z 3)) (c)"
        );
    }

    #[test]
    fn self_inclusion() {
        let loader = MemoryLoader::new().with("main.ae", "(use \"./main.ae\")");
        let error = session(loader).compile_path(Path::new("main.ae")).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Io);
        assert_eq!(error.reason, "File `main.ae` includes itself");
    }

    #[test]
    fn transitive_cycle() {
        let loader = MemoryLoader::new()
            .with("a.ae", "(use \"sub/b.ae\")")
            .with("sub/b.ae", "(use \"../a.ae\")");
        let error = session(loader).compile_path(Path::new("a.ae")).unwrap_err();
        assert_eq!(error.reason, "File `a.ae` includes itself");
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let loader = MemoryLoader::new()
            .with("main.ae", "(use \"l.ae\") (use \"r.ae\")")
            .with("l.ae", "(use \"base.ae\")")
            .with("r.ae", "(use \"base.ae\")")
            .with("base.ae", "1");

        let ir = session(loader).compile_path(Path::new("main.ae")).unwrap();
        assert_eq!(print_block(&ir), "(block (block 1)) (block (block 1))");
    }

    #[test]
    fn include_depth_is_bounded() {
        let loader = MemoryLoader::new()
            .with("0.ae", "(use \"1.ae\")")
            .with("1.ae", "(use \"2.ae\")")
            .with("2.ae", "(use \"3.ae\")")
            .with("3.ae", "done");

        let shallow = Config {
            max_include_depth: 2,
            ..Config::default()
        };
        let error = session(loader.clone())
            .with_config(shallow)
            .compile_path(Path::new("0.ae"))
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Io);

        let ir = session(loader).compile_path(Path::new("0.ae")).unwrap();
        assert_eq!(print_block(&ir), "(block (block (block done)))");
    }

    #[test]
    fn error_in_included_file_points_there() {
        let loader = MemoryLoader::new()
            .with("main.ae", "(use \"bad.ae\")")
            .with("bad.ae", "\n(let 5)");
        let error = session(loader).compile_path(Path::new("main.ae")).unwrap_err();
        let (path, position) = error.location().unwrap();
        assert_eq!(path, "bad.ae");
        assert_eq!(position, crate::common::Position::new(1, 5));
    }

    struct Denied;

    impl Loader for Denied {
        fn load(&self, _path: &Path) -> io::Result<Rc<Source>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "access denied"))
        }
    }

    #[test]
    fn read_failures_keep_their_cause() {
        let error = Session::new()
            .with_loader(Denied)
            .compile_path(Path::new("main.ae"))
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Io);
        assert_eq!(error.reason, "File `main.ae` could not be read: access denied");
    }

    #[test]
    fn invalid_utf8_on_disk() {
        let path = std::env::temp_dir().join("aether-session-invalid-utf8.ae");
        std::fs::write(&path, [0x28, 0xff, 0xfe, 0x29]).unwrap();

        let error = Session::new().compile_path(&path).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Io);
        assert!(error.reason.contains("could not be read"), "{}", error.reason);

        let _ = std::fs::remove_file(&path);
    }

    /// Treats `#` as the start of a comment, deferring to the
    /// default grammar for everything else.
    struct HashComments(Grammar);

    impl TransitionTable for HashComments {
        fn longest_match(&self, remaining: &str) -> Option<(TokenKind, usize)> {
            match remaining.starts_with('#') {
                true => Some((TokenKind::Comment, 1)),
                false => self.0.longest_match(remaining),
            }
        }
    }

    #[test]
    fn custom_table_drives_scanning() {
        let mut session = Session::new().with_table(HashComments(Grammar::default()));
        let ir = session
            .compile(Source::source("(f 1) # not ( a form\n(g)"))
            .unwrap();
        assert_eq!(print_block(&ir), "(f 1) (g)");

        let error = Session::new()
            .compile(Source::source("(f 1) # note"))
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Lex);
    }

    fn nesting(depth: usize) -> Config {
        Config {
            max_nesting_depth: depth,
            ..Config::default()
        }
    }

    #[test]
    fn nesting_counts_across_includes() {
        let shallow = MemoryLoader::new()
            .with("main.ae", "[(use \"x.ae\")]")
            .with("x.ae", "1");
        let ir = session(shallow)
            .with_config(nesting(3))
            .compile_path(Path::new("main.ae"))
            .unwrap();
        assert_eq!(print_block(&ir), "[(block 1)]");

        let deep = MemoryLoader::new()
            .with("main.ae", "[(use \"x.ae\")]")
            .with("x.ae", "[1]");
        let error = session(deep)
            .with_config(nesting(3))
            .compile_path(Path::new("main.ae"))
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Syntax);
        assert_eq!(error.location().unwrap().0, "x.ae");
    }
}
