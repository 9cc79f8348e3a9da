//! Token dispatch and tree construction.

use cssm_diagnostic::Diagnostic;
use cssm_ir::{Escaped, Namespace, Node, NodeId, NodeKind, Position, SelectorTree, SourceSpan, Spaces};
use cssm_lexer::{Token, TokenKind};
use smallvec::SmallVec;
use tracing::trace;

use crate::cursor::Cursor;
use crate::{escape_error, to_u32, ParseOptions};

/// Which compound sub-selector a slice of a word starts.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Segment {
    Tag,
    Class,
    Id,
}

/// Colons already consumed for a pseudo whose name is the next word.
struct PseudoStart {
    prefix: String,
    first_token: usize,
}

pub(crate) struct Parser<'a> {
    pub(crate) cursor: Cursor<'a>,
    tree: SelectorTree,
    /// Selector receiving new nodes.
    current: NodeId,
    /// Whitespace waiting for the next node's `spaces.before`.
    pending_spaces: String,
    pub(crate) options: ParseOptions,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str, tokens: &'a [Token], options: ParseOptions) -> Self {
        let mut tree = SelectorTree::new();
        let root = tree.root();
        let selector = tree.alloc_kind(NodeKind::Selector);
        tree.append(root, selector);
        Parser {
            cursor: Cursor::new(source, tokens),
            tree,
            current: selector,
            pending_spaces: String::new(),
            options,
        }
    }

    pub(crate) fn parse(mut self) -> Result<SelectorTree, Diagnostic> {
        while !self.cursor.is_at_end() {
            self.parse_token()?;
        }
        self.flush_pending_spaces();
        self.finish_selector(self.current);

        if self.cursor.len() > 0 {
            let span = self.cursor.span(0, self.cursor.len() - 1);
            let root = self.tree.root();
            self.tree.get_mut(root).source = Some(span);
        }
        Ok(self.tree)
    }

    fn parse_token(&mut self) -> Result<(), Diagnostic> {
        let Some(kind) = self.cursor.current_kind() else {
            return Ok(());
        };
        trace!(?kind, pos = self.cursor.position(), "selector token");
        match kind {
            TokenKind::Space => self.space(),
            TokenKind::Comment => {
                self.comment();
                Ok(())
            }
            TokenKind::OpenParen => self.parentheses(),
            TokenKind::CloseParen => Err(Diagnostic::missing_parenthesis(
                "Expected an opening parenthesis.",
                self.cursor.offset(),
            )),
            TokenKind::OpenSquare => self.attribute(),
            TokenKind::Dollar | TokenKind::Caret | TokenKind::Equals | TokenKind::Word => self.word(),
            TokenKind::Colon => self.pseudo(),
            TokenKind::Comma => self.comma(),
            TokenKind::Asterisk => self.universal(None),
            TokenKind::Ampersand => self.nesting(),
            TokenKind::Slash | TokenKind::Combinator => self.combinator(),
            TokenKind::Str => {
                self.string();
                Ok(())
            }
            TokenKind::CloseSquare => Err(Diagnostic::missing_square_bracket(
                "Expected an opening square bracket.",
                self.cursor.offset(),
            )),
            TokenKind::Semicolon => Err(Diagnostic::unexpected(
                "Expected a backslash preceding the semicolon.",
                self.cursor.offset(),
            )),
            TokenKind::Bang => Err(self.unexpected_here()),
        }
    }

    // Helpers

    pub(crate) fn optional_space<'s>(&self, space: &'s str) -> &'s str {
        if self.options.lossy {
            ""
        } else {
            space
        }
    }

    fn required_space<'s>(&self, space: &'s str) -> &'s str {
        if self.options.lossy {
            " "
        } else {
            space
        }
    }

    fn unexpected_here(&self) -> Diagnostic {
        Diagnostic::unexpected(
            format!("Unexpected \"{}\".", self.cursor.content()),
            self.cursor.offset(),
        )
    }

    fn escaped(text: &str, offset: u32) -> Result<Escaped, Diagnostic> {
        Escaped::from_source(text).map_err(|err| escape_error(offset, err))
    }

    /// Attach a node to the current selector, giving it the pending spaces.
    fn push(&mut self, kind: NodeKind, span: SourceSpan, source_index: u32) -> NodeId {
        let spaces = Spaces::new(std::mem::take(&mut self.pending_spaces), "");
        let node = Node::new(kind)
            .with_spaces(spaces)
            .with_source(span, source_index);
        let id = self.tree.alloc(node);
        self.tree.append(self.current, id);
        id
    }

    pub(crate) fn push_tokens(&mut self, kind: NodeKind, first: usize, last: usize) -> NodeId {
        let span = self.cursor.span(first, last);
        let index = self.cursor.offset_at(first);
        self.push(kind, span, index)
    }

    /// Record that the input ended before `id`'s closing bracket.
    pub(crate) fn mark_unclosed(&mut self, id: NodeId) {
        self.tree.get_mut(id).unclosed = true;
    }

    fn selector_has_only_comments(&self) -> bool {
        self.tree
            .children(self.current)
            .iter()
            .all(|&c| matches!(self.tree.kind(c), NodeKind::Comment(_)))
    }

    /// Give pending whitespace to the last node, or hold it in an empty
    /// string node when the selector has none.
    fn flush_pending_spaces(&mut self) {
        if self.pending_spaces.is_empty() {
            return;
        }
        let spaces = std::mem::take(&mut self.pending_spaces);
        match self.tree.last(self.current) {
            Some(last) => self.tree.get_mut(last).spaces.after.push_str(&spaces),
            None => {
                let node =
                    Node::new(NodeKind::String(String::new())).with_spaces(Spaces::new(spaces, ""));
                let id = self.tree.alloc(node);
                self.tree.append(self.current, id);
            }
        }
    }

    fn finish_selector(&mut self, selector: NodeId) {
        let children = self.tree.children(selector);
        let first = children.iter().find_map(|&c| {
            let node = self.tree.get(c);
            node.source.map(|span| (span, node.source_index))
        });
        let last = children
            .iter()
            .rev()
            .find_map(|&c| self.tree.get(c).source);
        if let (Some((start, index)), Some(end)) = (first, last) {
            let node = self.tree.get_mut(selector);
            node.source = Some(start.to(end));
            node.source_index = index;
        }
    }

    // Whitespace and comments

    fn space(&mut self) -> Result<(), Diagnostic> {
        let content = self.cursor.content();
        let at_selector_start = self.cursor.position() == 0
            || matches!(
                self.cursor.prev_kind(),
                Some(TokenKind::Comma | TokenKind::OpenParen)
            )
            || self.selector_has_only_comments();

        if at_selector_start {
            let space = self.optional_space(content);
            self.pending_spaces.push_str(space);
            self.cursor.advance();
            return Ok(());
        }

        if self.cursor.is_last()
            || matches!(
                self.cursor.peek_kind(),
                Some(TokenKind::Comma | TokenKind::CloseParen)
            )
        {
            let space = self.optional_space(content);
            match self.tree.last(self.current) {
                Some(last) => self.tree.get_mut(last).spaces.after.push_str(space),
                None => self.pending_spaces.push_str(space),
            }
            self.cursor.advance();
            return Ok(());
        }

        self.combinator()
    }

    fn comment(&mut self) -> NodeId {
        let pos = self.cursor.position();
        let value = self.cursor.content().to_owned();
        let id = self.push_tokens(NodeKind::Comment(value), pos, pos);
        self.cursor.advance();
        id
    }

    fn string(&mut self) {
        let pos = self.cursor.position();
        let value = self.cursor.content().to_owned();
        self.push_tokens(NodeKind::String(value), pos, pos);
        self.cursor.advance();
    }

    /// Consume whitespace and comments up to `stop`, attaching comments as
    /// nodes. Returns the whitespace after the last comment.
    fn trivia_run(&mut self, stop: usize) -> String {
        let mut acc = String::new();
        while self.cursor.position() < stop {
            if self.cursor.check(TokenKind::Comment) {
                self.pending_spaces.push_str(&acc);
                acc.clear();
                self.comment();
            } else {
                acc.push_str(self.optional_space(self.cursor.content()));
                self.cursor.advance();
            }
        }
        acc
    }

    /// Whitespace and comments before a comma, `)`, or the end.
    fn trailing_trivia(&mut self, stop: usize) {
        let mut acc = String::new();
        let mut last_comment = None;
        while self.cursor.position() < stop {
            if self.cursor.check(TokenKind::Comment) {
                self.pending_spaces.push_str(&acc);
                acc.clear();
                last_comment = Some(self.comment());
            } else {
                acc.push_str(self.optional_space(self.cursor.content()));
                self.cursor.advance();
            }
        }
        if acc.is_empty() {
            return;
        }
        match last_comment.or_else(|| self.tree.last(self.current)) {
            Some(id) => self.tree.get_mut(id).spaces.after.push_str(&acc),
            None => self.pending_spaces.push_str(&acc),
        }
    }

    // Combinators

    fn is_named_combinator(&self) -> bool {
        let pos = self.cursor.position();
        self.cursor.kind_at(pos) == Some(TokenKind::Slash)
            && self.cursor.kind_at(pos + 1) == Some(TokenKind::Word)
            && self.cursor.kind_at(pos + 2) == Some(TokenKind::Slash)
    }

    /// `/name/`
    fn named_combinator(&mut self) -> Result<(NodeKind, usize, usize), Diagnostic> {
        let first = self.cursor.position();
        let name = self.cursor.content_at(first + 1);
        let logical = Self::escaped(name, self.cursor.offset_at(first + 1))?;
        let raw = logical.raw().map(|raw| format!("/{raw}/"));
        let value = format!("/{}/", logical.value());
        self.cursor.set_position(first + 3);
        Ok((NodeKind::Combinator { value, raw }, first, first + 2))
    }

    fn combinator(&mut self) -> Result<(), Diagnostic> {
        if self.cursor.content() == "|" {
            return self.namespace(Namespace::Empty);
        }

        let start = self.cursor.position();
        let next = self.cursor.next_meaningful(start);
        let stop = next.unwrap_or(self.cursor.len());
        let at_boundary = next.map_or(true, |i| {
            matches!(
                self.cursor.kind_at(i),
                Some(TokenKind::Comma | TokenKind::CloseParen)
            )
        });
        if at_boundary {
            self.trailing_trivia(stop);
            return Ok(());
        }

        let leading = (stop > start).then(|| self.trivia_run(stop));

        let explicit = if self.is_named_combinator() {
            Some(self.named_combinator()?)
        } else if self.cursor.check(TokenKind::Combinator) {
            let pos = self.cursor.position();
            let value = self.cursor.content();
            self.cursor.advance();
            Some((NodeKind::combinator(value), pos, pos))
        } else {
            None
        };

        if let Some((kind, first, last)) = explicit {
            let id = self.push_tokens(kind, first, last);
            let mut after = String::new();
            if self.cursor.check(TokenKind::Space) {
                after.push_str(self.optional_space(self.cursor.content()));
                self.cursor.advance();
            }
            // Whitespace held over from the selector start comes first.
            let spaces = &mut self.tree.get_mut(id).spaces;
            if let Some(leading) = leading {
                spaces.before.push_str(&leading);
            }
            spaces.after = after;
            return Ok(());
        }

        let Some(ws) = leading else {
            return Err(self.unexpected_here());
        };

        // Descendant combinator. A lone space prints as the value itself;
        // anything else keeps its exact text.
        let (before, raw) = if self.options.lossy || ws == " " {
            (String::new(), None)
        } else if let Some(rest) = ws.strip_suffix(' ') {
            (rest.to_owned(), None)
        } else {
            (String::new(), Some(ws))
        };
        let id = self.push_tokens(
            NodeKind::Combinator {
                value: " ".to_owned(),
                raw,
            },
            start,
            stop - 1,
        );
        self.tree.get_mut(id).spaces.before.push_str(&before);
        Ok(())
    }

    // Names

    /// The cursor is on `|`; the prefix before it has been consumed.
    fn namespace(&mut self, namespace: Namespace) -> Result<(), Diagnostic> {
        let pipe = self.cursor.offset();
        self.cursor.advance();
        match self.cursor.current_kind() {
            Some(TokenKind::Word) => self.split_word(Some(namespace), None),
            Some(TokenKind::Asterisk) => self.universal(Some(namespace)),
            _ => Err(Diagnostic::unexpected("Unexpected \"|\".", pipe)),
        }
    }

    fn word(&mut self) -> Result<(), Diagnostic> {
        if self.cursor.check(TokenKind::Word) && self.cursor.next_is_pipe() {
            let prefix = Self::escaped(self.cursor.content(), self.cursor.offset())?;
            self.cursor.advance();
            return self.namespace(Namespace::Named(prefix));
        }
        self.split_word(None, None)
    }

    fn universal(&mut self, namespace: Option<Namespace>) -> Result<(), Diagnostic> {
        if namespace.is_none() && self.cursor.next_is_pipe() {
            self.cursor.advance();
            return self.namespace(Namespace::Named(Escaped::verbatim("*")));
        }
        let pos = self.cursor.position();
        self.push_tokens(NodeKind::Universal { namespace }, pos, pos);
        self.cursor.advance();
        Ok(())
    }

    fn nesting(&mut self) -> Result<(), Diagnostic> {
        if self.cursor.next_is_pipe() {
            self.cursor.advance();
            return self.namespace(Namespace::Named(Escaped::verbatim("&")));
        }
        let pos = self.cursor.position();
        self.push_tokens(NodeKind::Nesting, pos, pos);
        self.cursor.advance();
        Ok(())
    }

    /// Split a word into tag, class, and id nodes at unescaped `.` and `#`.
    fn split_word(
        &mut self,
        mut namespace: Option<Namespace>,
        pseudo: Option<PseudoStart>,
    ) -> Result<(), Diagnostic> {
        let first = self.cursor.position();
        let mut word = String::from(self.cursor.content());
        while matches!(
            self.cursor.peek_kind(),
            Some(TokenKind::Dollar | TokenKind::Caret | TokenKind::Equals | TokenKind::Word)
        ) {
            self.cursor.advance();
            word.push_str(self.cursor.content());
        }
        let Some(&first_token) = self.cursor.token(first) else {
            return Ok(());
        };

        let segments = split_segments(&word);
        if segments.len() > 1 && self.cursor.peek_kind() == Some(TokenKind::OpenParen) {
            return Err(Diagnostic::unexpected(
                "Misplaced parenthesis.",
                self.cursor.offset_at(self.cursor.position() + 1),
            ));
        }
        if namespace.is_some() && segments.first().map(|s| s.1) != Some(Segment::Tag) {
            return Err(Diagnostic::unexpected(
                "Expected a type selector after the namespace separator.",
                first_token.start_pos,
            ));
        }

        for (n, &(start, segment)) in segments.iter().enumerate() {
            let end = segments.get(n + 1).map_or(word.len(), |s| s.0);
            let text = &word[start..end];
            let offset = first_token.start_pos + to_u32(start);
            let span = SourceSpan::new(
                Position::new(first_token.start_line, first_token.start_col + to_u32(start)),
                Position::new(first_token.start_line, first_token.start_col + to_u32(end) - 1),
            );

            let (kind, span, index) = match (&pseudo, n, segment) {
                (Some(p), 0, _) => {
                    let colon = self.cursor.span(p.first_token, p.first_token);
                    (
                        NodeKind::Pseudo(format!("{}{text}", p.prefix)),
                        colon.to(span),
                        self.cursor.offset_at(p.first_token),
                    )
                }
                (_, _, Segment::Class) => (
                    NodeKind::ClassName(Self::escaped(&text[1..], offset + 1)?),
                    span,
                    offset,
                ),
                (_, _, Segment::Id) => (
                    NodeKind::Id(Self::escaped(&text[1..], offset + 1)?),
                    span,
                    offset,
                ),
                (_, _, Segment::Tag) => (
                    NodeKind::Tag {
                        value: Self::escaped(text, offset)?,
                        namespace: namespace.take(),
                    },
                    span,
                    offset,
                ),
            };
            self.push(kind, span, index);
        }

        self.cursor.advance();
        Ok(())
    }

    fn pseudo(&mut self) -> Result<(), Diagnostic> {
        let first = self.cursor.position();
        let mut prefix = String::new();
        while self.cursor.check(TokenKind::Colon) {
            prefix.push(':');
            self.cursor.advance();
        }
        if self.cursor.check(TokenKind::Word) {
            return self.split_word(
                None,
                Some(PseudoStart {
                    prefix,
                    first_token: first,
                }),
            );
        }
        Err(Diagnostic::unexpected(
            "Expected a pseudo-class or pseudo-element.",
            self.cursor.offset(),
        ))
    }

    // Groups

    fn parentheses(&mut self) -> Result<(), Diagnostic> {
        let open = self.cursor.position();
        let open_offset = self.cursor.offset();
        let last = self.tree.last(self.current);
        self.cursor.advance();

        if let Some(pseudo) = last.filter(|&id| matches!(self.tree.kind(id), NodeKind::Pseudo(_))) {
            if !self.tree.children(pseudo).is_empty() {
                return Err(Diagnostic::unexpected("Misplaced parenthesis.", open_offset));
            }
            return self.pseudo_arguments(pseudo, open_offset);
        }

        let mut depth = 1usize;
        let mut text = String::from("(");
        while depth > 0 {
            let Some(kind) = self.cursor.current_kind() else {
                if self.options.safe {
                    break;
                }
                return Err(Diagnostic::missing_parenthesis(
                    "Expected a closing parenthesis.",
                    open_offset,
                ));
            };
            match kind {
                TokenKind::OpenParen => depth += 1,
                TokenKind::CloseParen => depth -= 1,
                _ => {}
            }
            let content = self.cursor.content();
            if kind == TokenKind::Space {
                text.push_str(self.required_space(content));
            } else {
                text.push_str(content);
            }
            self.cursor.advance();
        }

        match last {
            Some(id) => self.append_to_value(id, &text, open_offset),
            None => {
                let close = self.cursor.position() - 1;
                self.push_tokens(NodeKind::String(text), open, close);
                Ok(())
            }
        }
    }

    /// Parse `( selector, ... )` into the pseudo's children.
    fn pseudo_arguments(&mut self, pseudo: NodeId, open_offset: u32) -> Result<(), Diagnostic> {
        let outer = self.current;
        let outer_pending = std::mem::take(&mut self.pending_spaces);
        let selector = self.tree.alloc_kind(NodeKind::Selector);
        self.tree.append(pseudo, selector);
        self.current = selector;

        let unclosed = loop {
            match self.cursor.current_kind() {
                None if self.options.safe => break true,
                None => {
                    return Err(Diagnostic::missing_parenthesis(
                        "Expected a closing parenthesis.",
                        open_offset,
                    ))
                }
                Some(TokenKind::CloseParen) => break false,
                Some(_) => self.parse_token()?,
            }
        };
        self.flush_pending_spaces();
        self.finish_selector(self.current);

        // Without a `)` the pseudo ends at the last token of the input.
        let last = if unclosed {
            self.cursor.len() - 1
        } else {
            self.cursor.position()
        };
        let close = self.cursor.span(last, last);
        let node = self.tree.get_mut(pseudo);
        node.source = node.source.map(|span| span.to(close));
        node.unclosed = unclosed;
        if !unclosed {
            self.cursor.advance();
        }
        self.current = outer;
        self.pending_spaces = outer_pending;
        Ok(())
    }

    /// A parenthesised group after a non-pseudo node extends its value.
    fn append_to_value(&mut self, id: NodeId, text: &str, offset: u32) -> Result<(), Diagnostic> {
        match self.tree.kind_mut(id) {
            NodeKind::ClassName(value) | NodeKind::Id(value) | NodeKind::Tag { value, .. } => {
                value.push_verbatim(text);
            }
            NodeKind::Pseudo(value) | NodeKind::String(value) | NodeKind::Comment(value) => {
                value.push_str(text);
            }
            NodeKind::Combinator { value, raw } => {
                value.push_str(text);
                if let Some(raw) = raw {
                    raw.push_str(text);
                }
            }
            _ => return Err(Diagnostic::unexpected("Unexpected \"(\".", offset)),
        }
        Ok(())
    }

    fn comma(&mut self) -> Result<(), Diagnostic> {
        if self.tree.children(self.current).is_empty() {
            return Err(Diagnostic::unexpected(
                "Unexpected comma before selector.",
                self.cursor.offset(),
            ));
        }
        self.flush_pending_spaces();

        let root = self.tree.root();
        let parent = self.tree.parent(self.current).unwrap_or(root);
        if self.cursor.is_last() && parent == root {
            self.tree.set_trailing_comma(true);
            self.cursor.advance();
            return Ok(());
        }

        self.finish_selector(self.current);
        let selector = self.tree.alloc_kind(NodeKind::Selector);
        self.tree.append(parent, selector);
        self.current = selector;
        self.cursor.advance();
        Ok(())
    }
}

/// Start offsets of the tag, class, and id parts of a compound word.
fn split_segments(word: &str) -> SmallVec<[(usize, Segment); 4]> {
    let bytes = word.as_bytes();
    let keyframe_percent = is_keyframe_percent(word);
    let mut segments = SmallVec::new();
    for (i, &b) in bytes.iter().enumerate() {
        let marker = match b {
            b'.' if !keyframe_percent => Some(Segment::Class),
            b'#' if bytes.get(i + 1) != Some(&b'{') => Some(Segment::Id),
            _ => None,
        };
        match marker {
            Some(segment) if !is_escaped(bytes, i) => segments.push((i, segment)),
            _ if i == 0 => segments.push((0, Segment::Tag)),
            _ => {}
        }
    }
    segments
}

/// Whether the byte at `index` follows an odd run of backslashes.
fn is_escaped(bytes: &[u8], index: usize) -> bool {
    bytes[..index]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count()
        % 2
        == 1
}

/// `12.5%` style keyframe selectors keep their dot.
fn is_keyframe_percent(word: &str) -> bool {
    let Some(body) = word.strip_suffix('%') else {
        return false;
    };
    let Some((int, frac)) = body.split_once('.') else {
        return false;
    };
    !int.is_empty()
        && !frac.is_empty()
        && int.bytes().all(|b| b.is_ascii_digit())
        && frac.bytes().all(|b| b.is_ascii_digit())
}
