//! The fixed header and helper text prepended to every emitted translation
//! unit (spec.md §4.4 "Prelude").

/// Standard headers and the `zn_read_line`/boolean-literal/`null` helpers
/// every generated C file carries regardless of which `include` directives
/// the source actually wrote. Zinc include directives (§6) add further
/// `#include`s above this block, but never replace it.
pub const PRELUDE: &str = r#"#include <stdio.h>
#include <stdlib.h>
#include <string.h>
#include <math.h>

#define yes 1
#define no 0
#define null NULL

/* Reads one line from `f` into a freshly heap-allocated buffer, stripping
 * the trailing newline. Returns NULL at end of input. */
static char *zn_read_line_from(FILE *f) {
    size_t cap = 64;
    size_t len = 0;
    char *buf = malloc(cap);
    if (!buf) return NULL;

    int c;
    while ((c = fgetc(f)) != EOF && c != '\n') {
        if (len + 1 >= cap) {
            cap *= 2;
            char *grown = realloc(buf, cap);
            if (!grown) {
                free(buf);
                return NULL;
            }
            buf = grown;
        }
        buf[len++] = (char)c;
    }
    if (len == 0 && c == EOF) {
        free(buf);
        return NULL;
    }
    buf[len] = '\0';
    return buf;
}

static char *zn_read_line(void) {
    return zn_read_line_from(stdin);
}
"#;
